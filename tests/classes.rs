mod common;

#[cfg(test)]
mod class_tests {
    use pretty_assertions::assert_eq;

    use super::common::{output_of, runtime_error};

    #[test]
    fn test_classes_01_class_and_instance_display() {
        assert_eq!(
            output_of("class Bagel {} print Bagel; print Bagel();"),
            "Bagel\nBagel instance\n"
        );
    }

    #[test]
    fn test_classes_02_fields_are_per_instance() {
        let source = r#"
            class Box {}
            var a = Box();
            var b = Box();
            a.value = 1;
            b.value = 2;
            a.value = a.value + 10;
            print a.value;
            print b.value;
        "#;

        assert_eq!(output_of(source), "11\n2\n");
    }

    #[test]
    fn test_classes_03_methods_bind_this() {
        let source = r#"
            class Person {
              init(name) {
                this.name = name;
              }

              greet() {
                print "Hi, " + this.name;
              }
            }

            var method = Person("Ada").greet;
            method();
        "#;

        assert_eq!(output_of(source), "Hi, Ada\n");
    }

    #[test]
    fn test_classes_04_initializer_returns_instance() {
        let source = r#"
            class Point {
              init(x) {
                this.x = x;
                return;
              }
            }

            var p = Point(1);
            print p.init(5) == p;
            print p.x;
        "#;

        assert_eq!(output_of(source), "true\n5\n");
    }

    #[test]
    fn test_classes_05_fields_shadow_methods() {
        let source = r#"
            class Thing {
              kind() { return "method"; }
            }

            var t = Thing();
            fun replacement() { return "field"; }
            t.kind = replacement;
            print t.kind();
        "#;

        assert_eq!(output_of(source), "field\n");
    }

    #[test]
    fn test_classes_06_inherited_method_binds_subclass_instance() {
        let source = r#"
            class Animal {
              describe() {
                return this.sound();
              }
            }

            class Dog < Animal {
              sound() { return "woof"; }
            }

            print Dog().describe();
        "#;

        assert_eq!(output_of(source), "woof\n");
    }

    #[test]
    fn test_classes_07_super_calls_the_superclass_method() {
        let source = r#"
            class A {
              method() { print "A method"; }
            }

            class B < A {
              method() { print "B method"; }
              test() { super.method(); }
            }

            class C < B {}

            C().test();
        "#;

        assert_eq!(output_of(source), "A method\n");
    }

    #[test]
    fn test_classes_08_inherited_initializer() {
        let source = r#"
            class Base {
              init(a, b) { this.sum = a + b; }
            }

            class Derived < Base {
              init(a, b, c) {
                super.init(a, b);
                this.sum = this.sum + c;
              }
            }

            class Plain < Base {}

            print Derived(1, 2, 3).sum;
            print Plain(4, 5).sum;
        "#;

        assert_eq!(output_of(source), "6\n9\n");
    }

    #[test]
    fn test_classes_09_methods_close_over_their_scope() {
        let source = r#"
            fun make(prefix) {
              class Tagger {
                tag(text) { return prefix + text; }
              }
              return Tagger;
            }

            var Warn = make("warn: ");
            print Warn().tag("disk");
        "#;

        assert_eq!(output_of(source), "warn: disk\n");
    }

    #[test]
    fn test_classes_10_undefined_property() {
        assert_eq!(
            runtime_error("class A {}\nprint A().missing;").1,
            "Undefined property 'missing'. [line 2]"
        );
    }

    #[test]
    fn test_classes_11_properties_need_instances() {
        assert_eq!(
            runtime_error("var n = 1;\nprint n.field;").1,
            "Only instances have properties. [line 2]"
        );
        assert_eq!(
            runtime_error("\"s\".field = 1;").1,
            "Only instances have fields. [line 1]"
        );
    }

    #[test]
    fn test_classes_12_class_arity() {
        assert_eq!(
            runtime_error("class A {}\nA(1);").1,
            "Expected 0 arguments but got 1. [line 2]"
        );
        assert_eq!(
            runtime_error("class B { init(x) {} }\nB();").1,
            "Expected 1 arguments but got 0. [line 2]"
        );
    }

    #[test]
    fn test_classes_13_superclass_must_be_a_class() {
        assert_eq!(
            runtime_error("var NotClass = \"nope\";\nclass Sub < NotClass {}").1,
            "Superclass must be a class. [line 2]"
        );
    }

    #[test]
    fn test_classes_14_instances_compare_by_identity() {
        let source = r#"
            class A {}
            var a = A();
            var b = a;
            print a == b;
            print a == A();
            print A == A;
        "#;

        assert_eq!(output_of(source), "true\nfalse\ntrue\n");
    }
}
