use recli::{record, ArgumentParser};

record! {
    /// A 2-d point.
    pub struct Point {
        /// Horizontal coordinate.
        pub x: i64 = 0,
        /// Vertical coordinate.
        pub y: i64 = 0,
    }
}

#[test]
fn values_distribute_positionally() {
    let ns = ArgumentParser::with_prog("segment")
        .add_arguments::<Point>("start")
        .add_arguments::<Point>("end")
        .parse_args(["--x", "1", "5", "--y", "2", "6"])
        .unwrap();
    assert_eq!(ns.get::<Point>("start"), Some(&Point { x: 1, y: 2 }));
    assert_eq!(ns.get::<Point>("end"), Some(&Point { x: 5, y: 6 }));
}

#[test]
fn single_values_broadcast_to_every_instance() {
    let ns = ArgumentParser::with_prog("segment")
        .add_arguments::<Point>("start")
        .add_arguments::<Point>("end")
        .parse_args(["--x", "3"])
        .unwrap();
    assert_eq!(ns.get::<Point>("start"), Some(&Point { x: 3, y: 0 }));
    assert_eq!(ns.get::<Point>("end"), Some(&Point { x: 3, y: 0 }));
}

#[test]
fn any_other_count_is_inconsistent() {
    let err = ArgumentParser::with_prog("triangle")
        .add_arguments::<Point>("a")
        .add_arguments::<Point>("b")
        .add_arguments::<Point>("c")
        .parse_args(["--x", "1", "2"])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "the field 'x' contains 2 values, but either 1 or 3 values were expected"
    );
}

#[test]
fn per_destination_defaults_apply_without_flags() {
    let ns = ArgumentParser::with_prog("segment")
        .add_arguments_with_default::<Point>("start", &Point { x: 1, y: 2 })
        .add_arguments_with_default::<Point>("end", &Point { x: 3, y: 4 })
        .parse_args(Vec::<String>::new())
        .unwrap();
    assert_eq!(ns.get::<Point>("start"), Some(&Point { x: 1, y: 2 }));
    assert_eq!(ns.get::<Point>("end"), Some(&Point { x: 3, y: 4 }));
}

#[test]
fn supplied_values_override_per_destination_defaults() {
    let ns = ArgumentParser::with_prog("segment")
        .add_arguments_with_default::<Point>("start", &Point { x: 1, y: 2 })
        .add_arguments::<Point>("end")
        .parse_args(["--x", "9"])
        .unwrap();
    assert_eq!(ns.get::<Point>("start"), Some(&Point { x: 9, y: 2 }));
    assert_eq!(ns.get::<Point>("end"), Some(&Point { x: 9, y: 0 }));
}

#[test]
fn bare_bool_flags_apply_to_every_instance() {
    record! {
        pub struct Job {
            /// Job identifier.
            pub id: i64 = 0,
            /// Verbose output.
            pub verbose: bool = false,
        }
    }

    let ns = ArgumentParser::with_prog("jobs")
        .add_arguments::<Job>("j1")
        .add_arguments::<Job>("j2")
        .parse_args(["--verbose", "--id", "1", "2"])
        .unwrap();
    assert_eq!(ns.get::<Job>("j1"), Some(&Job { id: 1, verbose: true }));
    assert_eq!(ns.get::<Job>("j2"), Some(&Job { id: 2, verbose: true }));
}

#[test]
fn distinct_bool_literals_distribute_like_any_value() {
    record! {
        pub struct Probe {
            /// Emit timing information.
            pub timing: bool = false,
        }
    }

    let ns = ArgumentParser::with_prog("probes")
        .add_arguments::<Probe>("p1")
        .add_arguments::<Probe>("p2")
        .parse_args(["--timing", "true", "false"])
        .unwrap();
    assert_eq!(ns.get::<Probe>("p1"), Some(&Probe { timing: true }));
    assert_eq!(ns.get::<Probe>("p2"), Some(&Probe { timing: false }));
}

#[test]
fn sequences_take_one_container_per_instance() {
    record! {
        pub struct Batch {
            /// Sample identifiers.
            pub ids: Vec<i64> = Vec::new(),
        }
    }

    let ns = ArgumentParser::with_prog("batches")
        .add_arguments::<Batch>("b1")
        .add_arguments::<Batch>("b2")
        .parse_args(["--ids", "1,2", "[3,4]"])
        .unwrap();
    assert_eq!(ns.get::<Batch>("b1"), Some(&Batch { ids: vec![1, 2] }));
    assert_eq!(ns.get::<Batch>("b2"), Some(&Batch { ids: vec![3, 4] }));

    let ns = ArgumentParser::with_prog("batches")
        .add_arguments::<Batch>("b1")
        .add_arguments::<Batch>("b2")
        .parse_args(["--ids", "7 8 9"])
        .unwrap();
    assert_eq!(ns.get::<Batch>("b1"), Some(&Batch { ids: vec![7, 8, 9] }));
    assert_eq!(ns.get::<Batch>("b2"), Some(&Batch { ids: vec![7, 8, 9] }));
}

#[test]
fn nested_records_distribute_too() {
    record! {
        /// Network settings.
        pub struct Net {
            /// Hidden layer width.
            pub hidden_dim: i64 = 32,
        }
    }
    record! {
        /// One experiment arm.
        pub struct Arm {
            /// Arm name.
            pub name: String = String::new(),
            /// Model settings.
            pub net: Net = Net { hidden_dim: 32 },
        }
    }

    let ns = ArgumentParser::with_prog("ab")
        .add_arguments::<Arm>("control")
        .add_arguments::<Arm>("treatment")
        .parse_args(["--name", "a", "b", "--net.hidden-dim", "64", "128"])
        .unwrap();
    let control = ns.get::<Arm>("control").unwrap();
    let treatment = ns.get::<Arm>("treatment").unwrap();
    assert_eq!(control.net.hidden_dim, 64);
    assert_eq!(treatment.net.hidden_dim, 128);
    assert_eq!(control.name, "a");
    assert_eq!(treatment.name, "b");
}
