//! Plain JSON inspection form of the tree.
//!
//! Every node becomes an object tagged by `"type"`. This is the observable form used
//! for structural comparison and by the CLI's JSON output.

use serde_json::{json, Value};

use super::{Arg, ArgList, Call, CallName, Def, Float, Int, Node, Operator, Term};

impl Int {
    pub fn to_json(&self) -> Value {
        match self.value() {
            Ok(value) => json!({ "type": "Int", "value": value }),
            // Out of i64 range: keep the literal rather than lose digits.
            Err(_) => json!({ "type": "Int", "value": self.tokens }),
        }
    }
}

impl Float {
    pub fn to_json(&self) -> Value {
        match self.value() {
            Ok(value) => json!({ "type": "Float", "value": value }),
            Err(_) => json!({ "type": "Float", "value": self.tokens }),
        }
    }
}

impl Operator {
    pub fn to_json(&self) -> Value {
        json!({ "type": "Operator", "value": self.symbol.to_string() })
    }
}

impl Term {
    pub fn to_json(&self) -> Value {
        json!({ "type": "Term", "value": self.text })
    }
}

impl CallName {
    pub fn to_json(&self) -> Value {
        match self {
            CallName::Term(term) => term.to_json(),
            CallName::Operator(op) => op.to_json(),
        }
    }
}

impl Call {
    pub fn to_json(&self) -> Value {
        json!({
            "type": "Call",
            "name": self.name.to_json(),
            "args": to_json_array(&self.args),
        })
    }
}

impl Arg {
    pub fn to_json(&self) -> Value {
        json!({
            "type": "Arg",
            "term": self.term.to_json(),
            "termType": self.term_type.to_json(),
        })
    }
}

impl ArgList {
    pub fn to_json(&self) -> Value {
        let args: Vec<Value> = self.args.iter().map(Arg::to_json).collect();
        json!({ "type": "ArgList", "args": args })
    }
}

impl Def {
    pub fn to_json(&self) -> Value {
        json!({
            "type": "Def",
            "name": self.name.to_json(),
            "args": self.args.to_json(),
            "body": to_json_array(&self.body),
        })
    }
}

impl Node {
    pub fn to_json(&self) -> Value {
        match self {
            Node::Int(n) => n.to_json(),
            Node::Float(n) => n.to_json(),
            Node::Operator(n) => n.to_json(),
            Node::Term(n) => n.to_json(),
            Node::Call(n) => n.to_json(),
            Node::Arg(n) => n.to_json(),
            Node::ArgList(n) => n.to_json(),
            Node::Def(n) => n.to_json(),
        }
    }
}

/// Converts a node sequence into a JSON array.
pub fn to_json_array(nodes: &[Node]) -> Value {
    Value::Array(nodes.iter().map(Node::to_json).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaves_serialise_with_type_tag() {
        assert_eq!(
            Node::from(Int::new(1, "42")).to_json(),
            json!({ "type": "Int", "value": 42 })
        );
        assert_eq!(
            Node::from(Float::new(1, "3.5")).to_json(),
            json!({ "type": "Float", "value": 3.5 })
        );
        assert_eq!(
            Node::from(Float::new(1, "1.2.3")).to_json(),
            json!({ "type": "Float", "value": "1.2.3" })
        );
        assert_eq!(
            Node::from(Operator::new(1, '%')).to_json(),
            json!({ "type": "Operator", "value": "%" })
        );
    }

    #[test]
    fn overflowing_int_keeps_its_text() {
        assert_eq!(
            Int::new(1, "123456789012345678901234").to_json(),
            json!({ "type": "Int", "value": "123456789012345678901234" })
        );
    }

    #[test]
    fn arg_uses_term_type_key() {
        let arg = Arg::new(1, Term::new(1, "x"), Term::new(1, "Int"));
        assert_eq!(
            arg.to_json(),
            json!({
                "type": "Arg",
                "term": { "type": "Term", "value": "x" },
                "termType": { "type": "Term", "value": "Int" },
            })
        );
    }
}
