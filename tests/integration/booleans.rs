use recli::{record, ArgumentParser};

record! {
    /// Runtime switches.
    pub struct Switches {
        /// Enable debug output.
        pub debug: bool = false,
        /// Write a cache (on by default).
        pub cache: bool = true,
    }
}

fn parse(args: &[&str]) -> Switches {
    let mut ns = ArgumentParser::with_prog("switches")
        .add_arguments::<Switches>("s")
        .parse_args(args.iter().copied())
        .unwrap();
    ns.take("s").unwrap()
}

#[test]
fn bare_flags_invert_their_defaults() {
    assert_eq!(parse(&[]), Switches { debug: false, cache: true });
    assert_eq!(parse(&["--debug"]), Switches { debug: true, cache: true });
    assert_eq!(parse(&["--cache"]), Switches { debug: false, cache: false });
    assert_eq!(
        parse(&["--debug", "--cache"]),
        Switches { debug: true, cache: false }
    );
}

#[test]
fn explicit_literals_always_win() {
    assert!(parse(&["--debug", "true"]).debug);
    assert!(!parse(&["--debug", "false"]).debug);
    assert!(parse(&["--cache=yes"]).cache);
    assert!(!parse(&["--cache=no"]).cache);
    assert!(parse(&["--debug", "1"]).debug);
    assert!(!parse(&["--debug", "0"]).debug);
    assert!(parse(&["--debug", "T"]).debug);
    assert!(!parse(&["--debug", "F"]).debug);
}

#[test]
fn garbage_literals_are_rejected() {
    let err = ArgumentParser::with_prog("switches")
        .add_arguments::<Switches>("s")
        .parse_args(["--debug", "maybe"])
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("--debug"), "{text}");
    assert!(text.contains("a boolean"), "{text}");
}

#[test]
fn defaultless_bools_require_an_explicit_value() {
    record! {
        pub struct Consent { pub agree: bool }
    }

    let err = ArgumentParser::with_prog("consent")
        .add_arguments::<Consent>("c")
        .parse_args(Vec::<String>::new())
        .unwrap_err();
    assert!(err.to_string().contains("--agree"));

    let ns = ArgumentParser::with_prog("consent")
        .add_arguments::<Consent>("c")
        .parse_args(["--agree", "yes"])
        .unwrap();
    assert!(ns.get::<Consent>("c").unwrap().agree);
}
