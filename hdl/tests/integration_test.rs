//! End-to-end tests for the parse → link → evaluate pipeline, exercising the
//! public facade the way a CLI driver would rather than any one crate's
//! internals. Each test corresponds to one of the concrete scenarios this
//! toolkit is expected to get right.

use std::collections::BTreeMap;

use n2t_hdl::{compile, exec_on_data, link, parse, Cell, CompositeInstance, LinkError, NullChipLoader, Registry, Word};

#[test]
fn mux_composite_from_primitives() {
    let source = r#"
        CHIP Mux {
            IN a, b, sel;
            OUT out;
            PARTS:
            Not(in=sel, out=notsel);
            And(a=a, b=notsel, out=w1);
            And(a=b, b=sel, out=w2);
            Or(a=w1, b=w2, out=out);
        }
    "#;
    let mut instance = compile(source, &NullChipLoader).expect("Mux should link");

    instance.input_pins_mut().set("a", Word::from_bits(1));
    instance.input_pins_mut().set("b", Word::ZERO);
    instance.input_pins_mut().set("sel", Word::ZERO);
    instance.evaluate();
    assert_eq!(instance.output_pins().get("out"), Word::from_bits(1));

    instance.input_pins_mut().set("sel", Word::from_bits(1));
    instance.evaluate();
    assert_eq!(instance.output_pins().get("out"), Word::ZERO);

    instance.input_pins_mut().set("a", Word::ZERO);
    instance.input_pins_mut().set("b", Word::from_bits(1));
    instance.input_pins_mut().set("sel", Word::from_bits(1));
    instance.evaluate();
    assert_eq!(instance.output_pins().get("out"), Word::from_bits(1));
}

#[test]
fn alu_zero_negate_add() {
    let registry = Registry::with_builtins();
    let class = registry.get("ALU").expect("ALU is a built-in");
    let mut instance = class.instantiate();

    instance.input_pins_mut().set("x", Word::from_bits(0xFFFF));
    instance.input_pins_mut().set("y", Word::from_bits(0x0001));
    instance.input_pins_mut().set("zx", Word::ZERO);
    instance.input_pins_mut().set("nx", Word::ZERO);
    instance.input_pins_mut().set("zy", Word::ZERO);
    instance.input_pins_mut().set("ny", Word::ZERO);
    instance.input_pins_mut().set("f", Word::from_bits(1));
    instance.input_pins_mut().set("no", Word::ZERO);
    instance.evaluate();
    assert_eq!(instance.output_pins().get("out"), Word::ZERO);
    assert_eq!(instance.output_pins().get("zr"), Word::from_bits(1));
    assert_eq!(instance.output_pins().get("ng"), Word::ZERO);

    instance.input_pins_mut().set("zx", Word::from_bits(1));
    instance.input_pins_mut().set("nx", Word::from_bits(1));
    instance.input_pins_mut().set("zy", Word::from_bits(1));
    instance.input_pins_mut().set("ny", Word::from_bits(1));
    instance.input_pins_mut().set("f", Word::from_bits(1));
    instance.input_pins_mut().set("no", Word::from_bits(1));
    instance.evaluate();
    assert_eq!(instance.output_pins().get("out"), Word::from_bits(0x0001));
    assert_eq!(instance.output_pins().get("zr"), Word::ZERO);
    assert_eq!(instance.output_pins().get("ng"), Word::ZERO);
}

#[test]
fn clocked_register_holds_value_until_next_load() {
    let registry = Registry::with_builtins();
    let class = registry.get("Register").expect("Register is a built-in");
    let mut instance = class.instantiate();

    instance.input_pins_mut().set("in", Word::from_bits(0xBEEF));
    instance.input_pins_mut().set("load", Word::from_bits(1));
    instance.evaluate();
    instance.clock_up().expect("rising edge should sample");
    instance.clock_down().expect("falling edge should commit");
    instance.evaluate();
    assert_eq!(instance.output_pins().get("out"), Word::from_bits(0xBEEF));

    instance.input_pins_mut().set("in", Word::from_bits(0x1234));
    instance.input_pins_mut().set("load", Word::ZERO);
    instance.evaluate();
    instance.clock_up().expect("rising edge should sample");
    instance.clock_down().expect("falling edge should commit");
    instance.evaluate();
    assert_eq!(instance.output_pins().get("out"), Word::from_bits(0xBEEF));
}

#[test]
fn conflicting_writers_are_reported_but_evaluation_stays_deterministic() {
    let source = r#"
        CHIP Conflicting {
            IN a;
            OUT out;
            PARTS:
            Not(in=a, out=out);
            And(a=a, b=a, out=out);
        }
    "#;
    let ast = parse(source).expect("should parse");
    let mut registry = Registry::with_builtins();
    let composite = link(&ast, &mut registry, &NullChipLoader).expect("should link");
    let mut instance = CompositeInstance::new(composite);

    let mut row = BTreeMap::new();
    row.insert("a".to_string(), Cell::Value(Word::from_bits(1)));
    let result = exec_on_data(&mut instance, std::slice::from_ref(&row));

    assert_eq!(result.conflicts.len(), 1);
    let conflict = &result.conflicts[0];
    assert_eq!(conflict.row, 0);
    assert_eq!(conflict.pin, "out");
    assert!(result.result[0].contains_key("out"));
}

#[test]
fn combinational_loop_is_rejected_at_link_time() {
    let source = r#"
        CHIP Loopy {
            IN y, w;
            OUT x, z;
            PARTS:
            And(a=x, b=y, out=z);
            And(a=z, b=w, out=x);
        }
    "#;
    let ast = parse(source).expect("should parse");
    let mut registry = Registry::with_builtins();
    let result = link(&ast, &mut registry, &NullChipLoader);
    assert!(matches!(result, Err(LinkError::CombinationalLoop(_))));
}

#[test]
fn parse_error_points_at_the_second_in_keyword() {
    let source = "CHIP Foo { IN a IN b; }";
    let error = parse(source).expect_err("duplicate IN should fail to parse");
    assert_eq!(error.line, 1);
    assert!(error.source_line.contains("IN a IN b"));
}
