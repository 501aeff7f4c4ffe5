use crate::models::{Difficulty, Question};

#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyBucket {
    pub difficulty: Difficulty,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicGroup {
    pub topic: String,
    /// Always easy, medium, hard in that order. Buckets may be empty.
    pub buckets: [DifficultyBucket; 3],
}

impl TopicGroup {
    fn new(topic: String) -> Self {
        Self {
            topic,
            buckets: Difficulty::ALL.map(|difficulty| DifficultyBucket {
                difficulty,
                questions: Vec::new(),
            }),
        }
    }
}

fn bucket_index(difficulty: Difficulty) -> usize {
    match difficulty {
        Difficulty::Easy => 0,
        Difficulty::Medium => 1,
        Difficulty::Hard => 2,
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupedQuestions {
    pub topics: Vec<TopicGroup>,
}

/// One line of the flattened display tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupRow<'a> {
    Topic(&'a str),
    Difficulty(Difficulty),
    Question(&'a Question),
}

impl GroupedQuestions {
    pub fn question_count(&self) -> usize {
        self.topics
            .iter()
            .flat_map(|t| t.buckets.iter())
            .map(|b| b.questions.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Flatten into display rows, skipping empty buckets.
    pub fn rows(&self) -> Vec<GroupRow<'_>> {
        let mut rows = Vec::new();
        for topic in &self.topics {
            rows.push(GroupRow::Topic(&topic.topic));
            for bucket in topic.buckets.iter().filter(|b| !b.questions.is_empty()) {
                rows.push(GroupRow::Difficulty(bucket.difficulty));
                rows.extend(bucket.questions.iter().map(GroupRow::Question));
            }
        }
        rows
    }

    /// Questions in display order (the selectable rows of the list page).
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.topics
            .iter()
            .flat_map(|t| t.buckets.iter())
            .flat_map(|b| b.questions.iter())
    }
}

/// Group questions by topic (first-seen order), then by difficulty.
///
/// Questions whose difficulty is not easy/medium/hard (case-insensitive) are
/// left out entirely; a topic made only of such questions does not appear.
pub fn group_questions(questions: &[Question]) -> GroupedQuestions {
    let mut topics: Vec<TopicGroup> = Vec::new();

    for question in questions {
        let Some(difficulty) = Difficulty::parse(&question.difficulty) else {
            continue;
        };

        let index = match topics.iter().position(|t| t.topic == question.title) {
            Some(index) => index,
            None => {
                topics.push(TopicGroup::new(question.title.clone()));
                topics.len() - 1
            }
        };

        topics[index].buckets[bucket_index(difficulty)]
            .questions
            .push(question.clone());
    }

    GroupedQuestions { topics }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn q(id: i64, title: &str, difficulty: &str) -> Question {
        Question {
            id,
            title: title.to_string(),
            difficulty: difficulty.to_string(),
            question: format!("q-{}", id),
            markdown: String::new(),
            created_at: None,
        }
    }

    #[test]
    fn test_topics_in_first_seen_order() {
        let input = vec![
            q(1, "Graphs", "easy"),
            q(2, "Arrays", "hard"),
            q(3, "Graphs", "medium"),
        ];
        let grouped = group_questions(&input);
        let topics: Vec<&str> = grouped.topics.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(topics, vec!["Graphs", "Arrays"]);
    }

    #[test]
    fn test_bucket_order_ignores_input_order() {
        let input = vec![
            q(1, "Trees", "Hard"),
            q(2, "Trees", "MEDIUM"),
            q(3, "Trees", "easy"),
        ];
        let grouped = group_questions(&input);
        let tree = &grouped.topics[0];
        assert_eq!(tree.buckets[0].difficulty, Difficulty::Easy);
        assert_eq!(tree.buckets[0].questions[0].id, 3);
        assert_eq!(tree.buckets[1].questions[0].id, 2);
        assert_eq!(tree.buckets[2].questions[0].id, 1);
    }

    #[test]
    fn test_unrecognized_difficulty_is_dropped() {
        let input = vec![
            q(1, "DP", "easy"),
            q(2, "DP", "insane"),
            q(3, "Bits", "unknown"),
        ];
        let grouped = group_questions(&input);
        assert_eq!(grouped.question_count(), 1);
        assert_eq!(grouped.topics.len(), 1);
        assert!(grouped.questions().all(|question| question.id != 2));
    }

    #[test]
    fn test_rows_skip_empty_buckets() {
        let input = vec![q(1, "Heaps", "hard"), q(2, "Heaps", "hard")];
        let grouped = group_questions(&input);
        let rows = grouped.rows();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], GroupRow::Topic("Heaps"));
        assert_eq!(rows[1], GroupRow::Difficulty(Difficulty::Hard));
        assert!(matches!(rows[2], GroupRow::Question(question) if question.id == 1));
    }

    #[test]
    fn test_empty_input() {
        let grouped = group_questions(&[]);
        assert!(grouped.is_empty());
        assert!(grouped.rows().is_empty());
    }

    fn difficulty_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("easy".to_string()),
            Just("Medium".to_string()),
            Just("HARD".to_string()),
            Just("legendary".to_string()),
            "[a-z]{0,6}",
        ]
    }

    proptest! {
        #[test]
        fn prop_every_recognized_question_lands_in_exactly_one_bucket(
            entries in prop::collection::vec(("[A-C]", difficulty_strategy()), 0..40)
        ) {
            let input: Vec<Question> = entries
                .iter()
                .enumerate()
                .map(|(i, (title, diff))| q(i as i64, title, diff))
                .collect();
            let grouped = group_questions(&input);

            for question in &input {
                let hits = grouped.questions().filter(|g| g.id == question.id).count();
                let expected = usize::from(Difficulty::parse(&question.difficulty).is_some());
                prop_assert_eq!(hits, expected);
            }

            for topic in &grouped.topics {
                for (bucket, expected) in topic.buckets.iter().zip(Difficulty::ALL) {
                    prop_assert_eq!(bucket.difficulty, expected);
                    for question in &bucket.questions {
                        prop_assert_eq!(Difficulty::parse(&question.difficulty), Some(expected));
                        prop_assert_eq!(&question.title, &topic.topic);
                    }
                }
            }
        }
    }
}
