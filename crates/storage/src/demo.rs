//! Built-in demo topics and question sets.

use quiz_core::model::{Question, QuestionId, Topic, TopicId};
use thiserror::Error;

use crate::repository::{QuestionRepository, StorageError, TopicRepository};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DemoError {
    #[error("invalid demo content: {0}")]
    Content(#[from] quiz_core::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

struct DemoTopic {
    id: u64,
    slug: &'static str,
    name: &'static str,
    icon: &'static str,
    questions: &'static [(&'static str, [&'static str; 4], usize)],
}

const DEMO_TOPICS: &[DemoTopic] = &[
    DemoTopic {
        id: 1,
        slug: "world-capitals",
        name: "World Capitals",
        icon: "🌍",
        questions: &[
            ("What is the capital of Australia?", ["Canberra", "Sydney", "Melbourne", "Perth"], 0),
            ("What is the capital of Canada?", ["Toronto", "Ottawa", "Vancouver", "Montreal"], 1),
            ("What is the capital of Brazil?", ["Rio de Janeiro", "São Paulo", "Brasília", "Salvador"], 2),
            ("What is the capital of Kenya?", ["Mombasa", "Kisumu", "Nakuru", "Nairobi"], 3),
            ("What is the capital of Norway?", ["Oslo", "Bergen", "Trondheim", "Stavanger"], 0),
        ],
    },
    DemoTopic {
        id: 2,
        slug: "solar-system",
        name: "Solar System",
        icon: "🪐",
        questions: &[
            ("Which planet is closest to the Sun?", ["Venus", "Mercury", "Mars", "Earth"], 1),
            ("Which planet has the most known moons?", ["Jupiter", "Uranus", "Saturn", "Neptune"], 2),
            ("What is the largest planet?", ["Jupiter", "Saturn", "Neptune", "Earth"], 0),
        ],
    },
    DemoTopic {
        id: 3,
        slug: "programming",
        name: "Programming",
        icon: "💻",
        questions: &[
            ("Which keyword declares an immutable binding in Rust?", ["var", "const", "let", "static"], 2),
            ("What does HTTP status 404 mean?", ["Forbidden", "Not Found", "Bad Request", "Gone"], 1),
            ("Which data structure is FIFO?", ["Stack", "Tree", "Heap", "Queue"], 3),
            ("How many bits are in a byte?", ["8", "16", "4", "32"], 0),
        ],
    },
];

/// Builds the demo topics with their ordered question sets.
///
/// # Errors
///
/// Returns `DemoError` if a demo entry fails validation.
pub fn demo_content() -> Result<Vec<(Topic, Vec<Question>)>, DemoError> {
    DEMO_TOPICS
        .iter()
        .map(|demo| -> Result<(Topic, Vec<Question>), quiz_core::Error> {
            let questions = demo
                .questions
                .iter()
                .zip(1_u64..)
                .map(|((text, options, correct), n)| {
                    let options = options.iter().map(ToString::to_string).collect();
                    Question::new(QuestionId::new(demo.id * 100 + n), *text, options, *correct)
                })
                .collect::<Result<Vec<_>, _>>()?;
            let count = u32::try_from(questions.len()).unwrap_or(u32::MAX);
            let topic = Topic::new(TopicId::new(demo.id), demo.slug, demo.name, demo.icon, count)?;
            Ok((topic, questions))
        })
        .collect::<Result<_, _>>()
        .map_err(DemoError::from)
}

/// Loads every demo topic and question set into the given repositories.
///
/// # Errors
///
/// Returns `DemoError` on validation or storage failures.
pub async fn seed_demo(
    topics: &dyn TopicRepository,
    questions: &dyn QuestionRepository,
) -> Result<usize, DemoError> {
    let content = demo_content()?;
    let count = content.len();
    for (topic, set) in content {
        topics.upsert_topic(&topic).await?;
        questions.replace_questions(topic.id(), set).await?;
    }
    Ok(count)
}
