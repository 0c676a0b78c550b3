//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Tables whose children are user-named components rather than fixed fields.
const MAP_TABLES: &[&str] = &["raw_material.baseline_tonnage", "raw_material.unit_costs"];

/// Map tables whose children are themselves `DriverRange` tables.
const RANGE_MAP_TABLES: &[&str] = &["drivers.mix_shares"];

const RANGE_FIELDS: &[&str] = &["min", "max", "step"];

/// Returns the complete set of fixed dotted key paths for `PlantConfig`.
///
/// Maintained manually to match the struct hierarchy in `plant_config.rs`.
/// Any new field added to `PlantConfig` must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [plant]
        "plant",
        "plant.name",
        "plant.period",
        "plant.currency",
        // [server]
        "server",
        "server.addr",
        "server.max_sessions",
        // [financials]
        "financials",
        "financials.revenue",
        "financials.fuel_cost",
        "financials.profit",
        "financials.volume_revenue_factor",
        // [pnl]
        "pnl",
        "pnl.revenue",
        "pnl.raw_material",
        "pnl.power_fuel",
        "pnl.distribution",
        "pnl.fixed_costs",
        // [raw_material]
        "raw_material",
        "raw_material.total_tonnage",
        "raw_material.baseline_pricing",
        "raw_material.baseline_tonnage",
        "raw_material.unit_costs",
        // [clinker]
        "clinker",
        "clinker.cement_volume_tons",
        "clinker.baseline_clinker_pct",
        "clinker.baseline_strength_mpa",
        "clinker.strength_slope_mpa_per_pct",
        "clinker.clinker_cost_per_ton",
        "clinker.additive_cost_per_ton",
        // [guardrails]
        "guardrails",
        "guardrails.critical_strength_mpa",
        "guardrails.warning_strength_mpa",
        // [packaging]
        "packaging",
        "packaging.total_bags",
        "packaging.avg_bag_cost",
        "packaging.baseline_spec_gsm",
        "packaging.cost_slope_per_gsm",
        "packaging.breakage_loss_per_bag",
        "packaging.breakage_table",
        // [power]
        "power",
        "power.energy_requirement_mmbtu",
        "power.gas_cost_per_mmbtu",
        "power.hfo_cost_per_mmbtu",
        "power.baseline_gas_pct",
        // [drivers]
        "drivers",
        "drivers.fuel_price",
        "drivers.fuel_price.min",
        "drivers.fuel_price.max",
        "drivers.fuel_price.step",
        "drivers.production_volume",
        "drivers.production_volume.min",
        "drivers.production_volume.max",
        "drivers.production_volume.step",
        "drivers.cement_price",
        "drivers.cement_price.min",
        "drivers.cement_price.max",
        "drivers.cement_price.step",
        "drivers.gas_utilization",
        "drivers.gas_utilization.min",
        "drivers.gas_utilization.max",
        "drivers.gas_utilization.step",
        "drivers.clinker_factor",
        "drivers.clinker_factor.min",
        "drivers.clinker_factor.max",
        "drivers.clinker_factor.step",
        "drivers.mix_shares",
    ];
    keys.iter().copied().collect()
}

/// Whether a dotted key is a fixed field or a legal child of a map table.
fn is_known_key(key: &str, known: &HashSet<&str>) -> bool {
    if known.contains(key) {
        return true;
    }
    let Some((parent, _)) = key.rsplit_once('.') else {
        return false;
    };
    if MAP_TABLES.contains(&parent) || RANGE_MAP_TABLES.contains(&parent) {
        return true;
    }
    // drivers.mix_shares.<component>.<field>
    if let Some((grandparent, _)) = parent.rsplit_once('.') {
        if RANGE_MAP_TABLES.contains(&grandparent) {
            return key
                .rsplit_once('.')
                .is_some_and(|(_, field)| RANGE_FIELDS.contains(&field));
        }
    }
    false
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`. Arrays of tables are not descended into.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns. Existing configs
/// always continue to work.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !is_known_key(key, &known))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate plausibility ranges on a parsed `PlantConfig`.
///
/// Returns `(errors, warnings)`. Errors are values that make the model
/// meaningless (shares outside 0-100, negative costs); warnings are values
/// that are legal but unusual for a cement plant.
pub fn validate_physical_ranges(
    config: &super::PlantConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let c = &config.clinker;
    if !(0.0..=100.0).contains(&c.baseline_clinker_pct) {
        errors.push(format!(
            "clinker.baseline_clinker_pct = {:.1} is outside 0-100%",
            c.baseline_clinker_pct
        ));
    } else if c.baseline_clinker_pct < 50.0 {
        warnings.push(ValidationWarning {
            field: "clinker.baseline_clinker_pct".to_string(),
            message: format!(
                "clinker.baseline_clinker_pct = {:.1} is unusually low for Portland cement (50-100%)",
                c.baseline_clinker_pct
            ),
            suggestion: None,
        });
    }
    if c.strength_slope_mpa_per_pct < 0.0 {
        errors.push(format!(
            "clinker.strength_slope_mpa_per_pct = {:.3} cannot be negative",
            c.strength_slope_mpa_per_pct
        ));
    }
    if c.cement_volume_tons < 0.0 {
        errors.push(format!(
            "clinker.cement_volume_tons = {:.0} cannot be negative",
            c.cement_volume_tons
        ));
    }
    if c.clinker_cost_per_ton < 0.0 || c.additive_cost_per_ton < 0.0 {
        errors.push("clinker unit costs cannot be negative".to_string());
    }

    // 28-day strength: 20-80 MPa spans every standard cement grade
    for (field, value) in [
        ("clinker.baseline_strength_mpa", c.baseline_strength_mpa),
        (
            "guardrails.critical_strength_mpa",
            config.guardrails.critical_strength_mpa,
        ),
        (
            "guardrails.warning_strength_mpa",
            config.guardrails.warning_strength_mpa,
        ),
    ] {
        if !(20.0..=80.0).contains(&value) {
            warnings.push(ValidationWarning {
                field: field.to_string(),
                message: format!("{field} = {value:.1} is outside typical range (20-80 MPa)"),
                suggestion: None,
            });
        }
    }

    for (component, cost) in &config.raw_material.unit_costs {
        if *cost < 0.0 {
            errors.push(format!(
                "raw_material.unit_costs.{component} = {cost:.2} cannot be negative"
            ));
        }
    }
    for (component, tons) in &config.raw_material.baseline_tonnage {
        if *tons < 0.0 {
            errors.push(format!(
                "raw_material.baseline_tonnage.{component} = {tons:.0} cannot be negative"
            ));
        }
    }

    let p = &config.packaging;
    for entry in &p.breakage_table {
        if !(0.0..=100.0).contains(&entry.breakage_pct) {
            errors.push(format!(
                "packaging.breakage_table: {} GSM breakage {:.2}% is outside 0-100%",
                entry.gsm, entry.breakage_pct
            ));
        }
        if !(40..=150).contains(&entry.gsm) {
            warnings.push(ValidationWarning {
                field: "packaging.breakage_table".to_string(),
                message: format!(
                    "packaging.breakage_table lists {} GSM, outside typical sack paper range (40-150)",
                    entry.gsm
                ),
                suggestion: None,
            });
        }
    }
    if p.total_bags < 0.0 || p.avg_bag_cost < 0.0 {
        errors.push("packaging.total_bags and avg_bag_cost cannot be negative".to_string());
    }

    let pw = &config.power;
    if !(0.0..=100.0).contains(&pw.baseline_gas_pct) {
        errors.push(format!(
            "power.baseline_gas_pct = {:.1} is outside 0-100%",
            pw.baseline_gas_pct
        ));
    }
    if pw.gas_cost_per_mmbtu < 0.0 || pw.hfo_cost_per_mmbtu < 0.0 {
        errors.push("power fuel costs cannot be negative".to_string());
    }

    // Share-type drivers must stay within 0-100%
    let d = &config.drivers;
    let share_ranges = [
        ("gas_utilization".to_string(), &d.gas_utilization),
        ("clinker_factor".to_string(), &d.clinker_factor),
    ]
    .into_iter()
    .chain(
        d.mix_shares
            .iter()
            .map(|(name, range)| (format!("mix_shares.{name}"), range)),
    );
    for (name, range) in share_ranges {
        if range.min < 0.0 || range.max > 100.0 {
            errors.push(format!(
                "drivers.{name} = [{:.1}, {:.1}] must stay within 0-100%",
                range.min, range.max
            ));
        }
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
