mod common;

use std::sync::Arc;

use packager_core::api::{
    messages, LogKind, MemoryStore, PresetStore, QueueDriver, SelectionItem, StartLabel,
    TaskStatus,
};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn alpha_installs_and_beta_is_not_found() {
    let (exec, host) = common::executor(&["alpha"]);
    let caller = exec.guard().local_operator();
    let mut driver = QueueDriver::new(Arc::new(exec.bind(caller)));

    driver
        .start(&SelectionItem::all_checked(["alpha", "beta"]), true)
        .unwrap();
    let summary = driver.run().await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);

    let results: Vec<(LogKind, String)> = driver
        .log()
        .result_lines()
        .map(|l| (l.kind, l.text.clone()))
        .collect();
    assert_eq!(
        results,
        vec![
            (
                LogKind::Success,
                format!("✅ alpha: {}", messages::INSTALLED_AND_ACTIVATED)
            ),
            (LogKind::Failure, format!("❌ beta: {}", messages::NOT_FOUND)),
        ]
    );

    let queue = driver.queue().unwrap();
    assert_eq!(queue.task("alpha").unwrap().status(), TaskStatus::Succeeded);
    assert_eq!(queue.task("beta").unwrap().status(), TaskStatus::Failed);
    assert!(!queue.is_running());
    assert_eq!(driver.controls().start_label, StartLabel::Finished);
    assert_eq!(driver.controls().start_label.text(), "✅ Finished!");

    assert!(host.is_active("alpha/alpha.php"));
    // beta never reached the host
    assert!(host.calls().iter().all(|c| !c.contains("beta")));
}

#[tokio::test]
async fn rerunning_a_queue_is_idempotent() {
    let (exec, host) = common::executor(&["alpha"]);

    for _ in 0..2 {
        let caller = exec.guard().local_operator();
        let mut driver = QueueDriver::new(Arc::new(exec.bind(caller)));
        driver
            .start(&SelectionItem::all_checked(["alpha"]), false)
            .unwrap();
        let summary = driver.run().await.unwrap();
        assert!(summary.all_succeeded());
        let line = driver.log().result_lines().next().unwrap().text.clone();
        assert_eq!(line, format!("✅ alpha: {}", messages::INSTALLED_MANUAL_ACTIVATION));
    }

    assert_eq!(host.calls().len(), 2);
    assert!(!host.is_active("alpha/alpha.php"));
}

#[tokio::test]
async fn queue_is_built_from_the_active_preset_snapshot() {
    let presets = PresetStore::new(Arc::new(MemoryStore::new()));
    presets
        .set_active_plugins(vec!["alpha".into(), "beta".into(), "gamma".into()])
        .await
        .unwrap();
    let snapshot = presets.active_snapshot().await.unwrap();

    // operator unticks beta
    let selection: Vec<SelectionItem> = snapshot
        .plugins
        .iter()
        .map(|slug| {
            if slug == "beta" {
                SelectionItem::unchecked(slug.clone())
            } else {
                SelectionItem::checked(slug.clone())
            }
        })
        .collect();

    // editing the preset mid-run does not change the queue
    let (exec, _host) = common::executor(&["alpha", "gamma"]);
    let caller = exec.guard().local_operator();
    let mut driver = QueueDriver::new(Arc::new(exec.bind(caller)));
    driver.start(&selection, true).unwrap();
    presets.set_active_plugins(vec!["other".into()]).await.unwrap();
    driver.run().await.unwrap();

    let ids: Vec<&str> = driver
        .queue()
        .unwrap()
        .tasks()
        .iter()
        .map(|t| t.identifier())
        .collect();
    assert_eq!(ids, vec!["alpha", "gamma"]);
}

#[tokio::test]
async fn caller_without_capability_fails_every_task() {
    let (exec, host) = common::executor(&["alpha", "beta"]);
    let mut caller = exec.guard().local_operator();
    caller.can_install = false;
    let mut driver = QueueDriver::new(Arc::new(exec.bind(caller)));

    driver
        .start(&SelectionItem::all_checked(["alpha", "beta"]), true)
        .unwrap();
    let summary = driver.run().await.unwrap();

    assert_eq!(summary.failed, 2);
    assert!(driver
        .log()
        .result_lines()
        .all(|l| l.text.ends_with(messages::NO_PERMISSION)));
    assert!(host.calls().is_empty());
}
