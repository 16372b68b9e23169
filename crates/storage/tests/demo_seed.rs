use std::sync::Arc;

use quiz_core::model::{AnswerChoice, AnswerRecord, ResultSummary, SessionId};
use quiz_core::time::fixed_now;
use storage::demo::seed_demo;
use storage::{
    InMemoryRepository, QuestionRepository, ResultRepository, Storage, StorageError,
    TopicRepository,
};

#[tokio::test]
async fn seeded_topics_serve_question_sets() {
    let repo = InMemoryRepository::new();
    let seeded = seed_demo(&repo, &repo).await.unwrap();
    let storage = Storage::from_repository(repo);
    assert_eq!(seeded, 3);

    let topics = storage.topics.list_topics().await.unwrap();
    assert_eq!(topics.len(), 3);

    let capitals = storage
        .topics
        .get_topic_by_slug("world-capitals")
        .await
        .unwrap();
    let questions = storage.questions.questions_for(capitals.id()).await.unwrap();
    assert_eq!(questions.len(), capitals.question_count() as usize);
    assert_eq!(questions[0].options()[questions[0].correct_index()], "Canberra");
}

#[tokio::test]
async fn results_are_recorded_once_per_session() {
    let repo = InMemoryRepository::new();
    seed_demo(&repo, &repo).await.unwrap();
    let storage = Storage::from_repository(repo);
    let topic = storage
        .topics
        .get_topic_by_slug("solar-system")
        .await
        .unwrap();

    let answers: Vec<AnswerRecord> = (1..=topic.question_count())
        .map(|i| {
            AnswerRecord::new(
                quiz_core::model::QuestionId::new(u64::from(i)),
                AnswerChoice::NoAnswer,
                false,
                15,
                0,
            )
        })
        .collect();
    let summary = ResultSummary::new(
        SessionId::generate(),
        topic.clone(),
        None,
        0,
        0,
        answers.len(),
        answers,
        fixed_now(),
        fixed_now(),
    )
    .unwrap();

    let results = Arc::clone(&storage.results);
    let id = results.record_result(&summary).await.unwrap();
    assert_eq!(results.get_result(id).await.unwrap(), summary);

    let err = results.record_result(&summary).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}
