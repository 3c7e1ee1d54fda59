// tests/property/runnable.rs

use proptest::prelude::*;
use unitdag::config::UnitConfig;
use unitdag::dag::UnitGraph;
use unitdag::{Dependency, Polarity, ResultRecord, Status, Unit};

fn status_strategy() -> impl Strategy<Value = Status> {
    prop::sample::select(Status::ALL.to_vec())
}

fn unit(name: &str, order: usize, deps: &[String]) -> Unit {
    Unit::new(
        name,
        order,
        UnitConfig {
            command: "true".into(),
            dependencies: deps.to_vec(),
            ..UnitConfig::default()
        },
    )
    .unwrap()
}

proptest! {
    #[test]
    fn unit_without_dependencies_is_runnable_iff_not_run(status in status_strategy()) {
        let graph = UnitGraph::from_units(vec![unit("solo", 0, &[])]).unwrap();
        let solo = graph.get("solo").unwrap();
        solo.results().set_status(status);

        prop_assert_eq!(graph.is_runnable(solo).unwrap(), status == Status::NotRun);
        // Evaluation never changes the status of a unit without dependencies.
        prop_assert_eq!(solo.status(), status);
    }

    #[test]
    fn polarity_decides_runnable_and_skip(target in status_strategy(), negated in any::<bool>()) {
        let raw = if negated { "!D".to_string() } else { "D".to_string() };
        let graph = UnitGraph::from_units(vec![
            unit("D", 0, &[]),
            unit("U", 1, &[raw]),
        ])
        .unwrap();
        graph.get("D").unwrap().results().set_status(target);
        let u = graph.get("U").unwrap();

        let (wanted, blocking) = if negated {
            (Status::Failed, Status::Succeeded)
        } else {
            (Status::Succeeded, Status::Failed)
        };

        let runnable = graph.is_runnable(u).unwrap();
        prop_assert_eq!(runnable, target == wanted);

        let expected = if target == blocking || target == Status::DependenciesNotMet {
            Status::DependenciesNotMet
        } else {
            Status::NotRun
        };
        prop_assert_eq!(u.status(), expected);
    }

    #[test]
    fn dependency_parse_strips_whitespace_and_one_marker(
        name in "[A-Za-z][A-Za-z0-9 _]{0,12}[A-Za-z0-9]",
        marker in prop::sample::select(vec!["", "!", "-"]),
        lead in " {0,3}",
        gap in " {0,3}",
        trail in " {0,3}",
    ) {
        let raw = format!("{lead}{marker}{gap}{name}{trail}");
        let dep = Dependency::parse(&raw);

        prop_assert_eq!(dep.name, name);
        let expected = if marker.is_empty() { Polarity::Positive } else { Polarity::Negated };
        prop_assert_eq!(dep.polarity, expected);
    }

    #[test]
    fn failed_is_sticky_under_success_signals(
        before in status_strategy(),
        repeats in 1usize..5,
    ) {
        let record = ResultRecord::new();
        record.set_status(before);
        for _ in 0..repeats {
            record.succeed_if_not_failed();
        }

        let expected = if before == Status::Failed { Status::Failed } else { Status::Succeeded };
        prop_assert_eq!(record.status(), expected);
    }
}
