//! Integration tests for running plans through the public API.

use std::cell::Cell;
use std::fs;
use std::rc::Rc;

use stackup::context::ProjectContext;
use stackup::installer::{CreateDirInstaller, FnInstaller};
use stackup::plan::{AutoApprove, Plan, PlanRunner, RunOptions, Step, StepOutcome};
use stackup::probe::{FnProbe, PathExists, ProbeStatus};
use stackup::shell::{HostEnv, ScriptedRunner};
use stackup::template::{template_step, TemplateSpec};
use stackup::StackupError;
use tempfile::TempDir;

fn touch(name: &str, file: &str) -> Step {
    let file = file.to_string();
    Step::new(
        name,
        PathExists::file(file.clone()),
        FnInstaller::new(format!("touch {}", file), move |_, ctx| {
            fs::write(ctx.path(&file), "")?;
            Ok(())
        }),
    )
}

/// Every entry under `root`, sorted.
fn entries(root: &std::path::Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn second_run_installs_nothing() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new();
    let mut host = HostEnv::new(&runner, temp.path());
    let mut gate = AutoApprove;
    let mut ctx = ProjectContext::new("demo", temp.path()).unwrap();

    let plan = Plan::new(vec![
        Step::new("src", PathExists::dir("src"), CreateDirInstaller::new("src")),
        template_step(TemplateSpec::new("README.md", "# {{project_name}}\n")).after("src"),
        touch("marker", "src/.keep").after("src"),
    ])
    .unwrap();

    let first = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);
    assert!(first.is_success());
    assert_eq!(first.installs, 3);
    assert_eq!(
        fs::read_to_string(temp.path().join("README.md")).unwrap(),
        "# demo\n"
    );

    let second = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);
    assert!(second.is_success());
    assert_eq!(second.installs, 0);
    assert!(second
        .steps
        .iter()
        .all(|s| matches!(s.outcome, StepOutcome::Skipped { .. })));
}

#[test]
fn steps_run_in_declared_order() {
    let order = Rc::new(std::cell::RefCell::new(Vec::new()));
    let recording = |name: &'static str| {
        let order = Rc::clone(&order);
        let done = Rc::new(Cell::new(false));
        let seen = Rc::clone(&done);
        Step::new(
            name,
            FnProbe::new("recorded", move |_, _| {
                if seen.get() {
                    ProbeStatus::Satisfied
                } else {
                    ProbeStatus::unsatisfied("not yet")
                }
            }),
            FnInstaller::new("record", move |_, _| {
                order.borrow_mut().push(name);
                done.set(true);
                Ok(())
            }),
        )
    };

    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new();
    let mut host = HostEnv::new(&runner, temp.path());
    let mut gate = AutoApprove;
    let mut ctx = ProjectContext::new("demo", temp.path()).unwrap();

    let plan = Plan::new(vec![recording("b"), recording("a")]).unwrap();
    PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);
    assert_eq!(*order.borrow(), vec!["b", "a"]);
}

fn dependent_pair() -> (Step, Step) {
    let make_dir = Step::new("a", PathExists::dir("a"), CreateDirInstaller::new("a"));
    // Writes into the directory only `a` creates.
    let fill = Step::new(
        "b",
        PathExists::file("a/b"),
        FnInstaller::new("write a/b", |_, ctx| {
            fs::write(ctx.path("a/b"), "")?;
            Ok(())
        }),
    );
    (make_dir, fill)
}

#[test]
fn dependent_steps_need_declared_order() {
    let runner = ScriptedRunner::new();
    let mut gate = AutoApprove;

    let reversed = TempDir::new().unwrap();
    let mut host = HostEnv::new(&runner, reversed.path());
    let mut ctx = ProjectContext::new("demo", reversed.path()).unwrap();
    let (make_dir, fill) = dependent_pair();
    let plan = Plan::new(vec![fill, make_dir]).unwrap();
    let report = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);
    assert!(!report.is_success());
    assert_eq!(report.failure.as_ref().unwrap().step, "b");
    assert!(report.step("a").is_none());
    assert!(!reversed.path().join("a").exists());

    let ordered = TempDir::new().unwrap();
    let mut host = HostEnv::new(&runner, ordered.path());
    let mut ctx = ProjectContext::new("demo", ordered.path()).unwrap();
    let (make_dir, fill) = dependent_pair();
    let plan = Plan::new(vec![make_dir, fill]).unwrap();
    let report = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);
    assert!(report.is_success());
    assert_eq!(report.installed(), vec!["a", "b"]);
    assert!(ordered.path().join("a/b").is_file());
}

#[test]
fn failure_halts_remaining_steps() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new();
    let mut host = HostEnv::new(&runner, temp.path());
    let mut gate = AutoApprove;
    let mut ctx = ProjectContext::new("demo", temp.path()).unwrap();

    let plan = Plan::new(vec![
        touch("first", "one"),
        Step::new(
            "offline",
            PathExists::file("two"),
            FnInstaller::new("download", |_, _| {
                Err(stackup::error::InstallError::NetworkUnavailable {
                    detail: "no route".to_string(),
                }
                .into())
            }),
        ),
        touch("third", "three"),
    ])
    .unwrap();

    let report = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);
    assert!(!report.is_success());
    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.failure.as_ref().unwrap().step, "offline");
    assert!(report.step("third").is_none());
    assert!(temp.path().join("one").exists());
    assert!(!temp.path().join("three").exists());
}

#[test]
fn declined_confirmation_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new();
    let mut host = HostEnv::new(&runner, temp.path());
    let mut asked = Vec::new();
    let mut decline = |label: &str, _reason: &str| {
        asked.push(label.to_string());
        false
    };
    let mut ctx = ProjectContext::new("demo", temp.path()).unwrap();

    let plan = Plan::new(vec![
        touch("system packages", "packages").confirm(),
        template_step(TemplateSpec::new("README.md", "hi")).after("system packages"),
    ])
    .unwrap();

    let report = PlanRunner::new(&mut host, &mut decline).run(&plan, &mut ctx);
    assert_eq!(report.exit_code(), 1);
    assert!(matches!(
        report.failure.as_ref().unwrap().error,
        StackupError::ConfirmationDeclined { .. }
    ));
    assert_eq!(asked, vec!["system packages"]);
    assert!(entries(temp.path()).is_empty());
}

#[test]
fn satisfied_confirmation_step_is_not_asked() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("packages"), "").unwrap();
    let runner = ScriptedRunner::new();
    let mut host = HostEnv::new(&runner, temp.path());
    let mut asked = 0;
    let mut gate = |_: &str, _: &str| {
        asked += 1;
        true
    };
    let mut ctx = ProjectContext::new("demo", temp.path()).unwrap();

    let plan = Plan::new(vec![touch("system packages", "packages").confirm()]).unwrap();
    let report = PlanRunner::new(&mut host, &mut gate).run(&plan, &mut ctx);
    assert!(report.is_success());
    drop(gate);
    assert_eq!(asked, 0);
}

#[test]
fn dry_run_reports_pending_work() {
    let temp = TempDir::new().unwrap();
    let runner = ScriptedRunner::new();
    let mut host = HostEnv::new(&runner, temp.path());
    let mut gate = AutoApprove;
    let mut ctx = ProjectContext::new("demo", temp.path()).unwrap();

    let plan = Plan::new(vec![touch("marker", "marker")]).unwrap();
    let report = PlanRunner::new(&mut host, &mut gate)
        .with_options(RunOptions { dry_run: true })
        .run(&plan, &mut ctx);

    assert!(report.is_success());
    assert!(report.has_pending());
    assert!(entries(temp.path()).is_empty());
}

#[test]
fn plan_rejects_dependency_on_later_step() {
    let err = Plan::new(vec![touch("a", "a").after("b"), touch("b", "b")]).unwrap_err();
    assert!(err.to_string().contains("runs later"));
}
