mod common;

#[cfg(test)]
mod resolver_tests {
    use pretty_assertions::assert_eq;

    use super::common::{output_of, run, static_errors};

    #[test]
    fn test_resolver_01_read_in_own_initializer() {
        assert_eq!(
            static_errors("var a = 1;\n{\n  var a = a;\n}"),
            ["[line 3] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_resolver_02_global_self_reference_is_allowed_statically() {
        // Globals are late bound, so this only fails when it runs.
        let (_, result) = run("var a = a;");

        assert!(matches!(result, Err(treelox::RunFailure::Runtime(_))));
    }

    #[test]
    fn test_resolver_03_redeclaration_in_local_scope() {
        assert_eq!(
            static_errors("{\n  var a = 1;\n  var a = 2;\n}"),
            ["[line 3] Error at 'a': Already a variable with this name in this scope."]
        );

        // Globals may be redeclared freely.
        assert_eq!(output_of("var a = 1; var a = 2; print a;"), "2\n");
    }

    #[test]
    fn test_resolver_04_duplicate_parameter() {
        assert_eq!(
            static_errors("fun f(a, a) {}"),
            ["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn test_resolver_05_top_level_return() {
        assert_eq!(
            static_errors("return 1;"),
            ["[line 1] Error at 'return': Can't return from top-level code."]
        );
    }

    #[test]
    fn test_resolver_06_initializer_return_value() {
        assert_eq!(
            static_errors("class A {\n  init() {\n    return 1;\n  }\n}"),
            ["[line 3] Error at 'return': Can't return a value from an initializer."]
        );

        // A bare return is fine.
        assert_eq!(
            output_of("class A { init() { return; } } print A();"),
            "A instance\n"
        );
    }

    #[test]
    fn test_resolver_07_this_outside_class() {
        assert_eq!(
            static_errors("print this;\nfun f() { return this; }"),
            [
                "[line 1] Error at 'this': Can't use 'this' outside of a class.",
                "[line 2] Error at 'this': Can't use 'this' outside of a class.",
            ]
        );
    }

    #[test]
    fn test_resolver_08_super_misuse() {
        assert_eq!(
            static_errors("super.m();"),
            ["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );
        assert_eq!(
            static_errors("class A { m() { super.m(); } }"),
            ["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );
    }

    #[test]
    fn test_resolver_09_class_inheriting_from_itself() {
        assert_eq!(
            static_errors("class Oops < Oops {}"),
            ["[line 1] Error at 'Oops': A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_resolver_10_all_errors_reported_in_one_pass() {
        let errors = static_errors("return;\n{ var x = x; }\nprint this;");

        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_resolver_11_static_error_stops_execution() {
        let (out, result) = run("print \"before\";\nreturn;");

        assert_eq!(out, "");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolver_12_closure_binds_lexically() {
        // The closure keeps seeing the outer `a` even after a shadowing
        // declaration appears later in the same block.
        let source = r#"
            var a = "global";
            {
              fun show() {
                print a;
              }

              show();
              var a = "block";
              show();
            }
        "#;

        assert_eq!(output_of(source), "global\nglobal\n");
    }
}
