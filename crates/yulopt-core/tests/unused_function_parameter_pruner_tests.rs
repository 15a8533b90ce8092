use indoc::indoc;
use yulopt_core::config::OptimizationLevel;
use yulopt_core::optimizer::analysis::{verify_call_arity, UsageAnalyzer};
use yulopt_core::parse;
use yulopt_test_helpers::{optimize, optimize_with_level, parse_program};

fn reprint(source: &str) -> String {
    parse_program(source).unwrap().to_string()
}

// ============================================================================
// Reference transformations
// ============================================================================

#[test]
fn test_drops_unused_parameter_and_return() {
    let source = indoc! {"
        {
            function f(a, b, c) -> x, y {
                x := div(a, b)
            }
            let z, w := f(1, 2, 3)
            sstore(0, z)
        }
    "};

    let output = optimize(source).unwrap();

    insta::assert_snapshot!(output, @r"
    {
        function f(a, b) -> x {
            x := div(a, b)
        }
        function f_1(a_1, b_1, c_1) -> x_1, y_1 {
            x_1 := f(a_1, b_1)
        }
        let z, w := f_1(1, 2, 3)
        sstore(0, z)
    }
    ");
}

#[test]
fn test_self_recursive_function() {
    let output = optimize("{ function rec(a, b) -> r { r := rec(a, 1) } }").unwrap();

    assert_eq!(
        output,
        indoc! {"
            {
                function rec(a) -> r {
                    r := rec_1(a, 1)
                }
                function rec_1(a_1, b_1) -> r_1 {
                    r_1 := rec(a_1)
                }
            }"}
    );
}

#[test]
fn test_function_without_slots_is_untouched() {
    let source = "{ function g() { sstore(0, 1) } g() g() }";
    assert_eq!(optimize(source).unwrap(), reprint(source));
}

#[test]
fn test_fully_used_function_is_untouched() {
    let source = indoc! {"
        {
            function h(u) -> v, w {
                v := u
                w := add(u, 1)
            }
            let p, q := h(4)
            sstore(p, q)
        }
    "};
    assert_eq!(optimize(source).unwrap(), reprint(source));
}

// ============================================================================
// Slot combinations
// ============================================================================

#[test]
fn test_only_returns_unused() {
    let output = optimize("{ function f(a) -> x, y { x := a } let p, q := f(5) sstore(p, q) }")
        .unwrap();

    assert!(output.contains("function f(a) -> x {"), "Got:\n{output}");
    assert!(
        output.contains("function f_1(a_1) -> x_1, y_1 {\n        x_1 := f(a_1)\n    }"),
        "Got:\n{output}"
    );
    assert!(output.contains("let p, q := f_1(5)"), "Got:\n{output}");
}

#[test]
fn test_nothing_used_gives_expression_statement_shim() {
    let output = optimize("{ function f(a) -> r { sstore(1, 1) } let z := f(7) }").unwrap();

    assert!(output.contains("function f() {"), "Got:\n{output}");
    assert!(
        output.contains("function f_1(a_1) -> r_1 {\n        f()\n    }"),
        "Got:\n{output}"
    );
    assert!(output.contains("let z := f_1(7)"), "Got:\n{output}");
}

#[test]
fn test_parameter_assigned_but_never_read_is_kept() {
    let source = "{ function f(a) -> x { a := 1 x := 2 } let y := f(3) sstore(y, y) }";
    assert_eq!(optimize(source).unwrap(), reprint(source));
}

#[test]
fn test_forwarding_function_is_left_to_the_inliner() {
    let source = indoc! {"
        {
            function g(a) -> r {
                r := a
            }
            function f(x, y) -> s {
                s := g(x)
            }
            let t := f(1, 2)
            sstore(t, t)
        }
    "};
    assert_eq!(optimize(source).unwrap(), reprint(source));
}

// ============================================================================
// Call sites
// ============================================================================

#[test]
fn test_all_call_sites_are_redirected() {
    let source = indoc! {"
        {
            function g(p, q) -> r {
                r := add(p, 1)
            }
            let s := g(1, 2)
            if s {
                let t := g(s, 3)
                sstore(t, 0)
            }
            for { let i := 0 } lt(i, 3) { i := add(i, 1) } {
                let k := g(i, i)
                sstore(k, k)
            }
            switch s
            case 0 {
                let m := g(0, 0)
                sstore(m, m)
            }
            default { }
        }
    "};

    let output = optimize(source).unwrap();

    assert!(output.contains("function g(p) -> r {"), "Got:\n{output}");
    // definition plus four call sites
    assert_eq!(output.matches("g_1(").count(), 5, "Got:\n{output}");
    assert!(output.contains("r_1 := g(p_1)"), "Got:\n{output}");
}

#[test]
fn test_calls_from_other_functions_are_redirected() {
    let source = indoc! {"
        {
            function leaf(a, unused) -> r {
                r := mul(a, 2)
            }
            function caller(n) -> m {
                m := leaf(n, 0)
            }
            let v := caller(4)
            sstore(0, v)
        }
    "};

    let output = optimize(source).unwrap();

    assert!(output.contains("m := leaf_1(n, 0)"), "Got:\n{output}");
    assert!(output.contains("r_1 := leaf(a_1)"), "Got:\n{output}");
}

#[test]
fn test_signatures_seen_by_callers_are_preserved() {
    let source = indoc! {"
        {
            function f(a, b, c) -> x, y, z {
                x := a
                z := c
            }
            function g(d) {
                sstore(0, 0)
            }
            let p, q, r := f(1, 2, 3)
            g(p)
            sstore(r, p)
        }
    "};
    let original = parse(source).unwrap();

    let output = optimize(source).unwrap();
    let program = parse(&output).unwrap();

    assert_eq!(verify_call_arity(&program), Ok(()));
    for (name, shim) in [("f", "f_1"), ("g", "g_1")] {
        let before = original.function(name).unwrap();
        let after = program.function(shim).unwrap();
        assert_eq!(after.parameters.len(), before.parameters.len());
        assert_eq!(after.return_variables.len(), before.return_variables.len());
    }
    assert_eq!(program.function("f").unwrap().parameters.len(), 2);
    assert_eq!(program.function("f").unwrap().return_variables.len(), 2);
    assert!(program.function("g").unwrap().parameters.is_empty());
}

// ============================================================================
// Fresh names
// ============================================================================

#[test]
fn test_shim_name_avoids_existing_names() {
    let source = indoc! {"
        {
            function f(a) {
                sstore(0, 0)
            }
            function f_1() {
                f(1)
            }
            f_1()
        }
    "};

    let output = optimize(source).unwrap();
    let program = parse(&output).unwrap();

    let names: Vec<_> = program.functions().map(|f| f.name.to_string()).collect();
    assert_eq!(names, vec!["f", "f_2", "f_1"]);
    assert!(output.contains("f_2(1)"), "Got:\n{output}");
}

#[test]
fn test_names_stay_unique() {
    let source = indoc! {"
        {
            function f(a, b) -> x {
                x := a
            }
            function g(a_1, b_1) -> y {
                y := b_1
            }
            let p := f(1, 2)
            let q := g(p, 3)
            sstore(p, q)
        }
    "};

    let output = optimize(source).unwrap();
    let program = parse(&output).unwrap();

    let mut seen = std::collections::HashSet::new();
    for func in program.functions() {
        for name in std::iter::once(&func.name)
            .chain(&func.parameters)
            .chain(&func.return_variables)
        {
            assert!(seen.insert(name.clone()), "duplicate name {name} in\n{output}");
        }
    }
}

// ============================================================================
// Idempotence and driver integration
// ============================================================================

#[test]
fn test_second_run_changes_nothing() {
    let source = indoc! {"
        {
            function f(a, b, c) -> x, y {
                x := div(a, b)
            }
            function rec(a_2, b_2) -> r {
                r := rec(a_2, 1)
            }
            let z, w := f(1, 2, 3)
            sstore(0, z)
        }
    "};

    let once = optimize(source).unwrap();
    let twice = optimize(&once).unwrap();

    assert_eq!(once, twice);
}

#[test]
fn test_no_unused_slots_after_pass() {
    let output = optimize("{ function f(a, b) -> x, y { y := b } let p, q := f(1, 2) }").unwrap();
    let program = parse(&output).unwrap();
    let usage = UsageAnalyzer::analyze(&program);

    assert!(!usage.get("f").unwrap().has_unused());
    assert!(usage.get("f_1").unwrap().forwarding);
    assert_eq!(usage.prunable().count(), 0);
}

#[test]
fn test_not_applied_at_minimal_level() {
    let source = "{ function f(a) { } f(1) }";
    let output = optimize_with_level(source, OptimizationLevel::Minimal).unwrap();
    assert_eq!(output, reprint(source));
}

#[test]
fn test_applied_at_aggressive_level() {
    let output =
        optimize_with_level("{ function f(a) { } f(1) }", OptimizationLevel::Aggressive).unwrap();
    assert!(output.contains("f_1(1)"), "Got:\n{output}");
}
