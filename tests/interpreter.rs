mod common;

#[cfg(test)]
mod interpreter_tests {
    use pretty_assertions::assert_eq;

    use treelox::{Lox, RunFailure};

    use super::common::{output_of, runtime_error, session, Capture};

    #[test]
    fn test_interpreter_01_print_literals() {
        assert_eq!(
            output_of("print 1; print 2.5; print \"hi\"; print true; print false; print nil;"),
            "1\n2.5\nhi\ntrue\nfalse\nnil\n"
        );
    }

    #[test]
    fn test_interpreter_02_arithmetic_and_concatenation() {
        assert_eq!(
            output_of("print 1 + 2; print 10 / 4; print -(3 * 2) - 1; print \"a\" + \"b\";"),
            "3\n2.5\n-7\nab\n"
        );
    }

    #[test]
    fn test_interpreter_03_division_by_zero_is_infinite() {
        assert_eq!(output_of("print 1 / 0; print -1 / 0;"), "inf\n-inf\n");
    }

    #[test]
    fn test_interpreter_04_comparison_and_equality() {
        let source = r#"
            print 1 < 2;
            print 2 <= 2;
            print 3 > 4;
            print 1 == 1;
            print "a" == "a";
            print nil == nil;
            print 1 == "1";
            print nil == false;
            print 1 != 2;
        "#;

        assert_eq!(
            output_of(source),
            "true\ntrue\nfalse\ntrue\ntrue\ntrue\nfalse\nfalse\ntrue\n"
        );
    }

    #[test]
    fn test_interpreter_05_truthiness() {
        let source = r#"
            if (nil) print "nil"; else print "nil is falsy";
            if (false) print "false"; else print "false is falsy";
            if (0) print "0 is truthy";
            if ("") print "empty string is truthy";
            print !nil;
            print !0;
        "#;

        assert_eq!(
            output_of(source),
            "nil is falsy\nfalse is falsy\n0 is truthy\nempty string is truthy\ntrue\nfalse\n"
        );
    }

    #[test]
    fn test_interpreter_06_logical_operators_short_circuit() {
        let source = r#"
            fun boom() { print "evaluated"; return true; }
            print nil or "fallback";
            print "first" or boom();
            print false and boom();
            print 1 and 2;
        "#;

        assert_eq!(output_of(source), "fallback\nfirst\nfalse\n2\n");
    }

    #[test]
    fn test_interpreter_07_block_scoping() {
        let source = r#"
            var a = "global";
            {
              var a = "local";
              print a;
            }
            print a;
        "#;

        assert_eq!(output_of(source), "local\nglobal\n");
    }

    #[test]
    fn test_interpreter_08_assignment_reaches_enclosing_scope() {
        let source = r#"
            var total = 0;
            {
              var step = 5;
              total = total + step;
              {
                total = total * 2;
              }
            }
            print total;
        "#;

        assert_eq!(output_of(source), "10\n");
    }

    #[test]
    fn test_interpreter_09_loops() {
        let source = r#"
            var i = 0;
            while (i < 3) { print i; i = i + 1; }
            for (var j = 10; j > 7; j = j - 1) print j;
        "#;

        assert_eq!(output_of(source), "0\n1\n2\n10\n9\n8\n");
    }

    #[test]
    fn test_interpreter_10_closures_share_and_separate_state() {
        let source = r#"
            fun makeCounter() {
              var count = 0;
              fun increment() {
                count = count + 1;
                return count;
              }
              return increment;
            }

            var a = makeCounter();
            var b = makeCounter();
            print a();
            print a();
            print b();
            print a();
        "#;

        assert_eq!(output_of(source), "1\n2\n1\n3\n");
    }

    #[test]
    fn test_interpreter_11_recursive_fibonacci() {
        let source = r#"
            fun fib(n) {
              if (n < 2) return n;
              return fib(n - 1) + fib(n - 2);
            }
            print fib(20);
        "#;

        assert_eq!(output_of(source), "6765\n");
    }

    #[test]
    fn test_interpreter_12_return_unwinds_loops() {
        let source = r#"
            fun firstOver(limit) {
              for (var i = 0; ; i = i + 1) {
                if (i * i > limit) return i;
              }
            }
            print firstOver(50);

            fun nothing() { return; }
            print nothing();

            fun implicit() {}
            print implicit();
        "#;

        assert_eq!(output_of(source), "8\nnil\nnil\n");
    }

    #[test]
    fn test_interpreter_13_function_values_print() {
        assert_eq!(
            output_of("fun f() {} print f; print clock;"),
            "<fn f>\n<native fn clock>\n"
        );
    }

    #[test]
    fn test_interpreter_14_clock_returns_seconds() {
        assert_eq!(output_of("print clock() > 1000000000;"), "true\n");
    }

    #[test]
    fn test_interpreter_15_mixed_addition_is_a_runtime_error() {
        assert_eq!(
            runtime_error("print \"ok\";\nprint 1 + \"a\";\nprint \"never\";"),
            (
                "ok\n".to_string(),
                "Operands must be two numbers or two strings. [line 2]".to_string()
            )
        );
    }

    #[test]
    fn test_interpreter_16_operand_type_errors() {
        assert_eq!(
            runtime_error("print -\"x\";").1,
            "Operand must be a number. [line 1]"
        );
        assert_eq!(
            runtime_error("print 1 < \"x\";").1,
            "Operands must be numbers. [line 1]"
        );
    }

    #[test]
    fn test_interpreter_17_undefined_variable() {
        assert_eq!(
            runtime_error("print missing;").1,
            "Undefined variable 'missing'. [line 1]"
        );
        assert_eq!(
            runtime_error("missing = 1;").1,
            "Undefined variable 'missing'. [line 1]"
        );
    }

    #[test]
    fn test_interpreter_18_call_errors() {
        assert_eq!(
            runtime_error("\"text\"();").1,
            "Can only call functions and classes. [line 1]"
        );
        assert_eq!(
            runtime_error("fun f(a, b) {}\nf(1);").1,
            "Expected 2 arguments but got 1. [line 2]"
        );
    }

    #[test]
    fn test_interpreter_19_state_persists_across_runs() {
        let (mut lox, capture) = session();

        assert!(lox.run("var greeting = \"hello\";").is_ok());
        assert!(lox.run("fun shout() { return greeting + \"!\"; }").is_ok());
        assert!(lox.run("print undefinedThing;").is_err());
        assert!(lox.run("print shout();").is_ok());

        assert_eq!(capture.contents(), "hello!\n");
    }

    #[test]
    fn test_interpreter_20_runtime_error_restores_scope() {
        let (mut lox, capture) = session();

        assert!(lox.run("var a = \"outer\"; { var a = \"inner\"; a(); }").is_err());
        assert!(lox.run("print a;").is_ok());

        assert_eq!(capture.contents(), "outer\n");
    }

    #[test]
    fn test_interpreter_21_deep_recursion_returns_its_value() {
        let source = r#"
            fun countDown(n) {
              if (n > 0) return countDown(n - 1);
              return "bottom";
            }
            print countDown(10000);

            fun sum(n) {
              if (n == 0) return 0;
              return n + sum(n - 1);
            }
            print sum(10000);
        "#;

        assert_eq!(output_of(source), "bottom\n50005000\n");
    }

    #[test]
    fn test_interpreter_22_deeply_nested_expression() {
        let depth: usize = 3000;
        let source = format!("print {}1{};", "(".repeat(depth), ")".repeat(depth));

        assert_eq!(output_of(&source), "1\n");
    }

    #[test]
    fn test_interpreter_23_runaway_recursion_is_a_runtime_error() {
        let capture = Capture::default();
        let mut lox = Lox::with_output(Box::new(capture.clone())).with_max_call_depth(200);

        let result = lox.run("fun forever(n) {\n  return forever(n + 1);\n}\nforever(0);");

        match result {
            Err(RunFailure::Runtime(e)) => {
                assert_eq!(e.to_string(), "Stack overflow. [line 2]")
            }
            other => panic!("expected a runtime error, got {:?}", other),
        }

        // The depth counter unwinds with the error.
        assert!(lox.run("fun f(n) { if (n > 0) return f(n - 1); return n; } print f(150);").is_ok());
        assert_eq!(capture.contents(), "0\n");
    }
}
