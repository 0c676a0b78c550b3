//! Executive insight lookup.
//!
//! A closed mapping from recognized question topics to fixed answers
//! grounded in the pilot's source documents. Questions are matched on whole
//! words against a keyword table in priority order. There is no language
//! understanding here; anything unrecognized gets the fallback answer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    FuelCost,
    Margin,
    Risk,
    LimestoneSensitivity,
    PowerGeneration,
    StoresSpares,
    Fallback,
}

/// Keyword table, checked top to bottom. First topic with a matching word wins.
const TOPIC_KEYWORDS: &[(Topic, &[&str])] = &[
    (Topic::PowerGeneration, &["gas", "generation", "pg", "arbitrage"]),
    (Topic::FuelCost, &["hfo", "fuel", "coal"]),
    (Topic::LimestoneSensitivity, &["limestone", "sulphur", "sulfur"]),
    (Topic::StoresSpares, &["stores", "spares", "refractory", "inventory"]),
    (Topic::Margin, &["margin", "profit", "profitability"]),
    (Topic::Risk, &["risk", "risks", "threat", "threats"]),
];

/// Preset questions offered as buttons, each bound to its topic.
pub const PRESET_QUESTIONS: &[(&str, Topic)] = &[
    ("What is the sensitivity of Limestone cost?", Topic::LimestoneSensitivity),
    ("Analyze Power Generation efficiency (Gas vs HFO).", Topic::PowerGeneration),
    ("Show me Stores & Spares utilization trends.", Topic::StoresSpares),
];

impl Topic {
    /// The canned answer for this topic.
    pub fn answer(self) -> &'static str {
        match self {
            Topic::FuelCost => {
                "Based on the Jan 26 P&L, HFO costs are projected at PKR 3.2B, representing 37% of \
                 total variable costs. The board presentation notes that rising HFO rates are the \
                 primary driver of margin erosion."
            }
            Topic::Margin => {
                "The gross margin is currently 23.20%, down from 24.87%. The decline is attributed \
                 to excessive curtailments and increased gas tariffs, despite a 19% increase in net \
                 revenue."
            }
            Topic::Risk => {
                "Key risks identified in the Dec 2023 board deck: 1. sustained gas curtailment, \
                 2. rising global coal prices, 3. exchange rate volatility affecting raw material \
                 imports."
            }
            Topic::LimestoneSensitivity => {
                "A 10% increase in low sulphur limestone price impacts gross margin by 42 bps, \
                 whereas high sulphur limestone only impacts it by 5 bps due to lower volume usage \
                 (COP sheet rows 8-9)."
            }
            Topic::PowerGeneration => {
                "PG HFO consumption is 16.3M liters vs gas 0.48M NM3. With gas at ~100 IQD/nm3 vs \
                 HFO at ~150k IQD/ton, shifting 20% of load to gas would save approx $180k/month."
            }
            Topic::StoresSpares => {
                "Stores & spares consumption is 5.4% over budget, primarily driven by kiln \
                 refractory replacements in Jan 2026 (HO report FC-VC-01)."
            }
            Topic::Fallback => {
                "Related data was found in the daily production report. For Jan 2026 clinker \
                 production is stable, but energy consumption per ton shows high variance on \
                 weekends."
            }
        }
    }
}

/// Resolved answer for one question.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Insight {
    pub topic: Topic,
    pub answer: &'static str,
}

/// Map a question to its topic.
///
/// Presets match exactly (case-insensitive); anything else goes through the
/// keyword table on whole lowercase words.
pub fn classify(question: &str) -> Topic {
    let trimmed = question.trim();
    if let Some((_, topic)) = PRESET_QUESTIONS
        .iter()
        .find(|(q, _)| q.eq_ignore_ascii_case(trimmed))
    {
        return *topic;
    }

    let words: Vec<String> = trimmed
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    TOPIC_KEYWORDS
        .iter()
        .find(|(_, keywords)| words.iter().any(|w| keywords.contains(&w.as_str())))
        .map_or(Topic::Fallback, |(topic, _)| *topic)
}

pub fn ask(question: &str) -> Insight {
    let topic = classify(question);
    Insight {
        topic,
        answer: topic.answer(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_resolve_to_their_topics() {
        for (question, topic) in PRESET_QUESTIONS {
            assert_eq!(classify(question), *topic, "{question}");
        }
    }

    #[test]
    fn test_keyword_topics() {
        assert_eq!(classify("Why is HFO so expensive?"), Topic::FuelCost);
        assert_eq!(classify("What happened to our margin?"), Topic::Margin);
        assert_eq!(classify("List the key risks"), Topic::Risk);
        assert_eq!(classify("refractory spend this month"), Topic::StoresSpares);
    }

    #[test]
    fn test_whole_word_matching() {
        // "profitless" and "gasket" must not match by substring
        assert_eq!(classify("gasket replacement"), Topic::Fallback);
        assert_eq!(classify("profitless talk"), Topic::Fallback);
    }

    #[test]
    fn test_priority_order() {
        // gas outranks fuel and margin
        assert_eq!(classify("gas fuel margin"), Topic::PowerGeneration);
        assert_eq!(classify("fuel and margin"), Topic::FuelCost);
    }

    #[test]
    fn test_unrecognized_question_falls_back() {
        let insight = ask("What is our current clinker-to-cement factor?");
        assert_eq!(insight.topic, Topic::Fallback);
        assert_eq!(insight.answer, Topic::Fallback.answer());
    }
}
