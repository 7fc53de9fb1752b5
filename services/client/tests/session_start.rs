mod common;

use common::{harness, Script};
use storybook_client_lib::viewmodel::{PriorSessionResolution, SessionStartViewModel, StartOutcome};
use storybook_core::{Language, Page, PortError, SessionId, StageStatus, User, UserId};

fn user() -> User {
    User {
        id: UserId::new("u1"),
        language: Language::new("en"),
        voice: None,
        current_session: None,
    }
}

fn page(index: usize, ready: bool) -> Page {
    let status = if ready {
        StageStatus::Ready
    } else {
        StageStatus::Pending
    };
    Page {
        session_id: SessionId::new("s9"),
        index,
        image: None,
        ocr_text: None,
        translated_text: None,
        audio: Vec::new(),
        ocr_status: status,
        tts_status: status,
    }
}

fn with_prior(script: Script) -> Script {
    Script {
        current_session: Some(SessionId::new("s9")),
        ..script
    }
}

#[tokio::test]
async fn starts_fresh_when_nothing_is_active() {
    let h = harness(Script::default());
    let vm = SessionStartViewModel::new(h.ctx.clone());

    let outcome = vm.start(&user(), 4, None).await.unwrap();

    match outcome {
        StartOutcome::Started(session) => {
            assert_eq!(session.id, SessionId::new("s1"));
            assert_eq!(session.total_pages, 4);
        }
        other => panic!("expected a new session, got {:?}", other),
    }
    assert_eq!(h.backend.calls(), vec!["info:u1", "start:u1:4"]);
}

#[tokio::test]
async fn active_session_must_be_resolved_first() {
    let h = harness(with_prior(Script::default()));
    let vm = SessionStartViewModel::new(h.ctx.clone());

    let err = vm.start(&user(), 4, None).await.unwrap_err();

    assert!(matches!(err, PortError::Precondition(_)));
    assert_eq!(h.backend.count("start"), 0);
}

#[tokio::test]
async fn ending_the_prior_session_precedes_the_new_one() {
    let h = harness(with_prior(Script::default()));
    let vm = SessionStartViewModel::new(h.ctx.clone());

    vm.start(&user(), 2, Some(PriorSessionResolution::End))
        .await
        .unwrap();

    assert_eq!(
        h.backend.calls(),
        vec!["info:u1", "session:s9", "end:s9", "start:u1:2"]
    );
}

#[tokio::test]
async fn discarding_the_prior_session_precedes_the_new_one() {
    let h = harness(with_prior(Script::default()));
    let vm = SessionStartViewModel::new(h.ctx.clone());

    vm.start(&user(), 2, Some(PriorSessionResolution::Discard))
        .await
        .unwrap();

    assert_eq!(
        h.backend.calls(),
        vec!["info:u1", "session:s9", "discard:s9", "start:u1:2"]
    );
}

#[tokio::test]
async fn failed_discard_blocks_the_new_session() {
    let h = harness(with_prior(Script {
        discard_fails: true,
        ..Script::default()
    }));
    let vm = SessionStartViewModel::new(h.ctx.clone());

    let err = vm
        .start(&user(), 2, Some(PriorSessionResolution::Discard))
        .await
        .unwrap_err();

    assert!(matches!(err, PortError::Status { status: 500, .. }));
    assert_eq!(h.backend.count("start"), 0);
}

#[tokio::test]
async fn resume_opens_the_first_unfinished_page() {
    let h = harness(with_prior(Script {
        reload_pages: vec![page(2, false), page(0, true), page(1, false)],
        ..Script::default()
    }));
    let vm = SessionStartViewModel::new(h.ctx.clone());

    let outcome = vm
        .start(&user(), 3, Some(PriorSessionResolution::Resume))
        .await
        .unwrap();

    match outcome {
        StartOutcome::Resumed {
            session_id,
            total_pages,
            pages,
            page_index,
        } => {
            assert_eq!(session_id, SessionId::new("s9"));
            assert_eq!(page_index, 1);
            assert_eq!(total_pages, 5);
            let order: Vec<usize> = pages.iter().map(|p| p.index).collect();
            assert_eq!(order, vec![0, 1, 2]);
        }
        other => panic!("expected a resumed session, got {:?}", other),
    }
    assert_eq!(h.backend.count("start"), 0);
}

#[tokio::test]
async fn resume_of_finished_session_opens_the_last_page() {
    let h = harness(Script {
        reload_pages: vec![page(0, true), page(1, true)],
        ..Script::default()
    });
    let vm = SessionStartViewModel::new(h.ctx.clone());

    match vm.resume(SessionId::new("s9"), 2).await.unwrap() {
        StartOutcome::Resumed { page_index, .. } => assert_eq!(page_index, 1),
        other => panic!("expected a resumed session, got {:?}", other),
    }
}

#[tokio::test]
async fn resume_without_pages_is_rejected() {
    let h = harness(Script::default());
    let vm = SessionStartViewModel::new(h.ctx.clone());

    let err = vm.resume(SessionId::new("s9"), 3).await.unwrap_err();
    assert!(matches!(err, PortError::Precondition(_)));
}

#[tokio::test]
async fn completed_prior_session_does_not_block_a_new_one() {
    let h = harness(with_prior(Script {
        completed_sessions: vec![SessionId::new("s9")],
        ..Script::default()
    }));
    let vm = SessionStartViewModel::new(h.ctx.clone());

    assert_eq!(vm.active_session(&user()).await, None);
    let outcome = vm.start(&user(), 4, None).await.unwrap();

    assert!(matches!(outcome, StartOutcome::Started(_)));
    assert_eq!(h.backend.count("end"), 0);
    assert_eq!(h.backend.count("discard"), 0);
    assert_eq!(h.backend.count("start"), 1);
}

#[tokio::test]
async fn active_prior_session_reports_its_declared_size() {
    let h = harness(with_prior(Script {
        prior_total_pages: 7,
        ..Script::default()
    }));
    let vm = SessionStartViewModel::new(h.ctx.clone());

    let prior = vm.active_session(&user()).await.unwrap();

    assert_eq!(prior.id, SessionId::new("s9"));
    assert_eq!(prior.total_pages, Some(7));
}

#[tokio::test]
async fn resumed_total_covers_every_uploaded_page() {
    let h = harness(Script {
        reload_pages: vec![page(0, true), page(1, true), page(2, false), page(3, true)],
        ..Script::default()
    });
    let vm = SessionStartViewModel::new(h.ctx.clone());

    match vm.resume(SessionId::new("s9"), 2).await.unwrap() {
        StartOutcome::Resumed {
            total_pages,
            page_index,
            ..
        } => {
            assert_eq!(total_pages, 4);
            assert_eq!(page_index, 2);
        }
        other => panic!("expected a resumed session, got {:?}", other),
    }
}
