mod player;

use std::fmt;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::mpsc;

use quiz_core::model::{AnswerChoice, ResultSummary, ResultsView, UserId};
use services::{Clock, Phase, PlayService, PlayerCommand, QuizSession, SessionEvent, SessionRunner};
use storage::demo::seed_demo;
use storage::repository::Storage;

use crate::player::{Move, SimulatedPlayer};

const DEFAULT_TOPIC: &str = "world-capitals";
const DEFAULT_ACCURACY: f64 = 0.7;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSeed { raw: String },
    InvalidAccuracy { raw: String },
    InvalidPlayer { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
            ArgsError::InvalidAccuracy { raw } => {
                write!(f, "invalid --accuracy value (expected 0.0 to 1.0): {raw}")
            }
            ArgsError::InvalidPlayer { raw } => write!(f, "invalid --player value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- play   [--topic <slug>] [--seed <u64>] [--accuracy <0..1>]");
    eprintln!("                             [--player <id>] [--live] [--json]");
    eprintln!("  cargo run -p app -- topics");
    eprintln!();
    eprintln!("Defaults for play:");
    eprintln!("  --topic {DEFAULT_TOPIC}");
    eprintln!("  --seed <random>");
    eprintln!("  --accuracy {DEFAULT_ACCURACY}");
    eprintln!();
    eprintln!("--live plays in real time instead of on the simulated clock.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_TOPIC, QUIZ_SEED, QUIZ_ACCURACY, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    Topics,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "topics" => Some(Self::Topics),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct PlayArgs {
    topic: String,
    seed: u64,
    accuracy: f64,
    player: Option<UserId>,
    live: bool,
    json: bool,
}

impl PlayArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut topic = std::env::var("QUIZ_TOPIC").unwrap_or_else(|_| DEFAULT_TOPIC.into());
        let mut seed = std::env::var("QUIZ_SEED")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or_else(rand::random);
        let mut accuracy = std::env::var("QUIZ_ACCURACY")
            .ok()
            .and_then(|value| parse_accuracy(&value).ok())
            .unwrap_or(DEFAULT_ACCURACY);
        let mut player = None;
        let mut live = false;
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--topic" => topic = require_value(args, "--topic")?,
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    seed = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                }
                "--accuracy" => {
                    let value = require_value(args, "--accuracy")?;
                    accuracy = parse_accuracy(&value)?;
                }
                "--player" => {
                    let value = require_value(args, "--player")?;
                    let id = value
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidPlayer { raw: value.clone() })?;
                    player = Some(id);
                }
                "--live" => live = true,
                "--json" => json = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            topic,
            seed,
            accuracy,
            player,
            live,
            json,
        })
    }
}

fn parse_accuracy(raw: &str) -> Result<f64, ArgsError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if (0.0..=1.0).contains(&value) => Ok(value),
        _ => Err(ArgsError::InvalidAccuracy {
            raw: raw.to_string(),
        }),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: play when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let storage = Storage::in_memory();
    let seeded = seed_demo(storage.topics.as_ref(), storage.questions.as_ref()).await?;
    debug!("seeded {seeded} demo topics");

    let service = PlayService::new(
        Clock::system(),
        Arc::clone(&storage.topics),
        Arc::clone(&storage.questions),
        Arc::clone(&storage.results),
    );

    match cmd {
        Command::Topics => {
            for topic in service.list_topics().await? {
                println!(
                    "{} {:<16} {} ({} questions)",
                    topic.icon(),
                    topic.slug(),
                    topic.name(),
                    topic.question_count()
                );
            }
            Ok(())
        }
        Command::Play => {
            let mut iter = argv.into_iter();
            let args = PlayArgs::parse(&mut iter).map_err(|e| {
                eprintln!("{e}");
                print_usage();
                e
            })?;
            play(&service, &args).await
        }
    }
}

async fn play(service: &PlayService, args: &PlayArgs) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "playing {} with seed {} and accuracy {}",
        args.topic, args.seed, args.accuracy
    );
    let session = service.open_lobby(&args.topic, args.player).await?;
    let player = SimulatedPlayer::new(args.seed, args.accuracy);
    let echo = !args.json;

    let summary = if args.live {
        play_live(session, player, echo).await?
    } else {
        Some(play_simulated(session, player, echo)?)
    };

    let Some(summary) = summary else {
        eprintln!("session ended without a result");
        return Ok(());
    };
    let recorded = service.record(summary).await?;
    let view = ResultsView::from_summary(&recorded.summary);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_results(&view);
    }
    Ok(())
}

/// Plays the whole session on its logical clock; no real waiting.
fn play_simulated(
    mut session: QuizSession,
    mut player: SimulatedPlayer,
    echo: bool,
) -> Result<ResultSummary, Box<dyn std::error::Error>> {
    let rules = session.rules().clone();
    session.start()?;

    while !session.is_finished() {
        match session.phase() {
            Phase::Playing if !session.is_answered() => {
                let question = session
                    .current_question()
                    .cloned()
                    .ok_or("no question on screen")?;
                match player.decide(&question, rules.time_budget_secs()) {
                    Move::Answer { think, choice } => {
                        session.advance_clock(think)?;
                        session.submit_answer(choice)?;
                    }
                    Move::Wait => session.advance_clock(rules.tick() * rules.time_budget_secs())?,
                }
            }
            Phase::Playing => session.advance_clock(rules.review_delay())?,
            Phase::Countdown | Phase::Lobby | Phase::Results => {
                session.advance_clock(rules.tick())?;
            }
        }
        for event in session.drain_events() {
            echo_event(&event, echo);
        }
    }

    Ok(session.into_summary().ok_or("session finished without a summary")?)
}

/// Plays the session in real time through a `SessionRunner`.
async fn play_live(
    session: QuizSession,
    mut player: SimulatedPlayer,
    echo: bool,
) -> Result<Option<ResultSummary>, Box<dyn std::error::Error>> {
    let questions = session.questions().to_vec();
    let budget = session.rules().time_budget_secs();

    let (commands, commands_rx) = mpsc::channel(8);
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let runner = tokio::spawn(SessionRunner::new(session, commands_rx, events_tx).run());

    commands.send(PlayerCommand::Start).await?;
    while let Some(event) = events.recv().await {
        echo_event(&event, echo);
        let SessionEvent::QuestionStarted { index, .. } = event else {
            continue;
        };
        let Some(question) = questions.get(index) else {
            continue;
        };
        if let Move::Answer { think, choice } = player.decide(question, budget) {
            tokio::time::sleep(think).await;
            commands.send(PlayerCommand::Answer(choice)).await?;
        }
    }

    Ok(runner.await?)
}

fn echo_event(event: &SessionEvent, echo: bool) {
    debug!("{event:?}");
    if !echo {
        return;
    }
    match event {
        SessionEvent::CountdownStarted { ticks } => println!("Get ready... {ticks}"),
        SessionEvent::CountdownTick { remaining } if *remaining > 0 => println!("{remaining}"),
        SessionEvent::QuestionStarted { index, .. } => println!("\nQuestion {}", index + 1),
        SessionEvent::TimedOut { .. } => println!("  time's up!"),
        SessionEvent::Answered { record, score, .. } => {
            let picked = match record.choice {
                AnswerChoice::Option(i) => format!("option {}", i + 1),
                AnswerChoice::NoAnswer => "no answer".to_string(),
            };
            let verdict = if record.correct { "correct" } else { "wrong" };
            println!(
                "  {picked} after {}s: {verdict}, +{} (score {score})",
                record.time_used_secs, record.points
            );
        }
        _ => {}
    }
}

fn print_results(view: &ResultsView) {
    println!();
    println!("── {} ──", view.topic_name);
    println!("Score:       {}", view.final_score);
    println!("Correct:     {}/{}", view.correct_count, view.total_questions);
    println!("Accuracy:    {}% ({})", view.accuracy_percent, view.performance);
    println!("Best streak: {}", view.best_streak);
    println!("XP earned:   {}", view.xp_earned);
    println!("  correct answers +{}", view.correct_answer_xp);
    println!("Rank:        {}", view.rank);
    println!();
    println!("{}", view.share_text());
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
