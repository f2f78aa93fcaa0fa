//! End-to-end turns through a real session with the template responder.

use std::sync::Arc;

use kai_core::config::KaiConfig;
use kai_core::Intent;
use kai_limbic::BoundaryEngine;
use kai_memory::{ReplySource, Responders, Session};
use kai_reasoning::TemplateResponder;

fn open(dir: &tempfile::TempDir, seed: u64) -> Session {
    let mut config = KaiConfig::default();
    config.storage.data_dir = dir.path().to_path_buf();
    config.rng_seed = Some(seed);
    let responder = Arc::new(TemplateResponder::new(Some(seed)));
    Session::open(config, Responders::rule_based(responder))
}

fn is_boundary_line(reply: &str) -> bool {
    BoundaryEngine::all_replies().any(|line| line.starts_with(reply))
}

#[tokio::test]
async fn test_repeated_insults_raise_boundaries() {
    let dir = tempfile::TempDir::new().unwrap();
    let session = open(&dir, 7);

    let hello = session.process_message("Hi!").await;
    assert_eq!(hello.source, ReplySource::Responder);
    assert_eq!(hello.intent, Some(Intent::Greeting));
    assert_eq!(hello.boundary.abuse_count, 0);
    assert!(!is_boundary_line(&hello.reply));

    let first = session.process_message("You're stupid").await;
    assert_eq!(first.boundary.abuse_count, 1);
    assert!(!first.boundary.defense_mode);
    assert_eq!(first.source, ReplySource::Responder);

    let second = session.process_message("You're stupid").await;
    assert_eq!(second.boundary.abuse_count, 2);
    assert!(!second.boundary.defense_mode);

    let third = session.process_message("You're stupid").await;
    assert_eq!(third.boundary.abuse_count, 3);
    assert!(third.boundary.defense_mode);
    assert!(matches!(
        third.source,
        ReplySource::Boundary | ReplySource::Harassment
    ));
    assert!(is_boundary_line(&third.reply), "not a boundary reply: {}", third.reply);

    let status = session.status().await;
    assert_eq!(status.context.profile.boundary_violations, 3);
    assert!(status.context.profile.pattern_harassment);
    assert_eq!(status.responder, "template");
}

#[tokio::test]
async fn test_violations_carry_over_to_next_session() {
    let dir = tempfile::TempDir::new().unwrap();
    {
        let session = open(&dir, 3);
        for insult in ["you are dumb", "you idiot", "what a loser"] {
            session.process_message(insult).await;
        }
        session.flush().await.unwrap();
    }

    let session = open(&dir, 3);
    let status = session.status().await;
    assert_eq!(status.context.turns, 3);
    assert!(status.boundary.defense_mode);

    // Already defending, so the next insult is met with a boundary line
    let out = session.process_message("you are useless").await;
    assert_eq!(out.source, ReplySource::Boundary);
    assert!(is_boundary_line(&out.reply));
}

#[tokio::test]
async fn test_friendly_chat_stays_in_character() {
    let dir = tempfile::TempDir::new().unwrap();
    let session = open(&dir, 11);

    let name = session.process_message("what's your name").await;
    assert!(name.reply.contains("Kai"), "{}", name.reply);

    let bye = session.process_message("gotta go, see you later").await;
    assert_eq!(bye.intent, Some(Intent::Farewell));
    assert_eq!(bye.source, ReplySource::Responder);

    assert_eq!(session.status().await.context.turns, 2);
}
