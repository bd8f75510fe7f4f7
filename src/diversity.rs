//! Topic diversity steering for question generation.
//!
//! The pipeline biases generation away from topics that were used
//! recently. `DiversityContext` summarizes recent usage; `build_instruction`
//! turns it into a natural-language steering block injected into the
//! generation prompt. Both are pure values with no I/O.

/// Summary of recently used topics for one exam session.
///
/// Constructed per generation request by the recency tracker and never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiversityContext {
    /// Recently used topics, duplicates removed, ordered by the first
    /// occurrence of each topic in the underlying event sequence.
    pub recent_topics: Vec<String>,
    /// Occurrence count per topic over the window, tallied over the raw
    /// (non-deduplicated) labels, in the same first-seen order.
    pub frequency_counts: Vec<(String, usize)>,
}

impl DiversityContext {
    /// Builds a context from raw topic labels in chronological order.
    ///
    /// Deduplicates preserving first-seen order and tallies frequencies
    /// over the full label sequence.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut recent_topics: Vec<String> = Vec::new();
        let mut frequency_counts: Vec<(String, usize)> = Vec::new();

        for label in labels {
            let label = label.into();
            if label.is_empty() {
                continue;
            }
            match frequency_counts.iter_mut().find(|(t, _)| *t == label) {
                Some((_, count)) => *count += 1,
                None => {
                    recent_topics.push(label.clone());
                    frequency_counts.push((label, 1));
                }
            }
        }

        Self {
            recent_topics,
            frequency_counts,
        }
    }

    /// Returns an empty context, used when recency tracking fails open.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether any recent topic is known.
    pub fn is_empty(&self) -> bool {
        self.recent_topics.is_empty()
    }

    /// Occurrence count for one topic, zero if unseen.
    pub fn count_for(&self, topic: &str) -> usize {
        self.frequency_counts
            .iter()
            .find(|(t, _)| t == topic)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// Number of most-frequent topics called out as over-used.
const OVERUSED_TOPIC_COUNT: usize = 2;

/// Builds the diversity steering instruction for the generation prompt.
///
/// Returns `None` when no recent topics are known, in which case the
/// prompt omits the diversity section entirely. Otherwise the block lists
/// the full frequency tally, names the most over-used topics (ties broken
/// by first-seen order, which is implementation-defined and not
/// semantically significant), and directs generation toward under-used
/// topics without lowering quality.
pub fn build_instruction(context: &DiversityContext) -> Option<String> {
    if context.is_empty() {
        return None;
    }

    let mut ranked: Vec<&(String, usize)> = context.frequency_counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let overused: Vec<&str> = ranked
        .iter()
        .take(OVERUSED_TOPIC_COUNT)
        .map(|(topic, _)| topic.as_str())
        .collect();

    let tally = context
        .frequency_counts
        .iter()
        .map(|(topic, count)| format!("- {}: {} time(s)", topic, count))
        .collect::<Vec<_>>()
        .join("\n");

    Some(format!(
        "## Topic diversity guidance\n\
         Recently generated question topics and how often each was used:\n\
         {tally}\n\
         The most over-used topics are: {overused}.\n\
         Prefer topics that are under-represented or absent from the list \
         above. Do not sacrifice question quality to achieve diversity; if \
         an under-used topic cannot support a strong question, a well-made \
         question on a listed topic is acceptable.",
        tally = tally,
        overused = overused.join(", "),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_labels_dedup_first_seen_order() {
        let context =
            DiversityContext::from_labels(["Security", "Networking", "Security"]);
        assert_eq!(context.recent_topics, vec!["Security", "Networking"]);
        assert_eq!(context.count_for("Security"), 2);
        assert_eq!(context.count_for("Networking"), 1);
        assert_eq!(context.count_for("Storage"), 0);
    }

    #[test]
    fn test_from_labels_skips_empty() {
        let context = DiversityContext::from_labels(["", "Compute", ""]);
        assert_eq!(context.recent_topics, vec!["Compute"]);
    }

    #[test]
    fn test_empty_context_yields_no_instruction() {
        assert_eq!(build_instruction(&DiversityContext::empty()), None);
    }

    #[test]
    fn test_instruction_mentions_every_topic() {
        let context = DiversityContext::from_labels([
            "Security",
            "Networking",
            "Security",
            "Storage",
            "Security",
            "Networking",
        ]);
        let instruction = build_instruction(&context).expect("non-empty context");
        for topic in ["Security", "Networking", "Storage"] {
            assert!(
                instruction.contains(topic),
                "instruction should mention {}: {}",
                topic,
                instruction
            );
        }
    }

    #[test]
    fn test_instruction_names_top_two_overused() {
        let context = DiversityContext::from_labels([
            "Security",
            "Security",
            "Security",
            "Networking",
            "Networking",
            "Storage",
        ]);
        let instruction = build_instruction(&context).expect("non-empty context");
        assert!(instruction.contains("Security, Networking"));
    }

    #[test]
    fn test_instruction_tie_broken_by_first_seen_order() {
        let context = DiversityContext::from_labels(["Databases", "Compute"]);
        let instruction = build_instruction(&context).expect("non-empty context");
        assert!(instruction.contains("Databases, Compute"));
    }

    #[test]
    fn test_single_topic_instruction() {
        let context = DiversityContext::from_labels(["Migration"]);
        let instruction = build_instruction(&context).expect("non-empty context");
        assert!(instruction.contains("Migration: 1 time(s)"));
    }
}
