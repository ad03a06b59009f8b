//! Drag-n-drop action records, shared by object events, timeline moments
//! and (indirectly) triggers.

use crate::{
    code::{CodeHandle, CodeRegistry},
    stream::DataCursor,
    ByteString, Error,
};

/// There is space for 8 parameters per action; more means the block is bad.
const MAX_PARAMS: usize = 8;

pub struct CodeAction {
    /// Id of the action library this action comes from
    pub lib_id: u32,

    /// Id of the action within its library
    pub id: u32,

    /// The action kind (0 - normal, 5 - repeat, 6 - variable, 7 - code, ...)
    pub action_kind: u32,

    pub can_be_relative: bool,

    /// Whether this action is a condition ("if" diamond in the editor)
    pub is_question: bool,

    pub applies_to_something: bool,

    /// How the action executes (0 - nothing, 1 - built-in function, 2 - code)
    pub execution_type: u32,

    /// What the action applies to: -1 for self, -2 for other, otherwise an
    /// object index.
    pub applies_to: i32,

    pub is_relative: bool,
    pub invert_condition: bool,

    pub params: Vec<ActionParam>,
}

pub enum ActionParam {
    /// An expression evaluated for its value (parameter type 0)
    Expression(CodeHandle),
    /// A block of GML run for its side effects (parameter type 1)
    Code(CodeHandle),
    /// Everything else: strings, numbers, menu choices, resource indices.
    /// Kept as the raw text; interpreting it is the runner's business.
    Literal(ByteString),
}

impl CodeAction {
    pub fn deserialize(cur: &mut DataCursor, registry: &mut dyn CodeRegistry) -> Result<Self, Error> {
        cur.skip(4)?; // data version, 440
        let lib_id = cur.read_u32()?;
        let id = cur.read_u32()?;
        let action_kind = cur.read_u32()?;
        let can_be_relative = cur.read_bool()?;
        let is_question = cur.read_bool()?;
        let applies_to_something = cur.read_bool()?;
        let execution_type = cur.read_u32()?;

        // function name and function body of built-in actions; the runner
        // resolves those from the action id instead
        let skip = cur.read_u32()? as usize;
        cur.skip(skip)?;
        let skip = cur.read_u32()? as usize;
        cur.skip(skip)?;

        let param_count = cur.read_u32()? as usize;
        if param_count > MAX_PARAMS {
            return Err(Error::CorruptBlock(format!("action has {} parameters", param_count)))
        }

        cur.skip(4)?; // data version
        let mut param_types = [0u32; MAX_PARAMS];
        for ty in param_types.iter_mut() {
            *ty = cur.read_u32()?;
        }

        let applies_to = cur.read_i32()?;
        let is_relative = cur.read_bool()?;

        cur.skip(4)?; // data version
        let mut params = Vec::with_capacity(param_count);
        for &ty in param_types.iter().take(param_count) {
            let arg = cur.read_pas_string()?;
            params.push(match ty {
                0 => ActionParam::Expression(registry.register_question(arg.as_ref())),
                1 => ActionParam::Code(registry.register(arg.as_ref())),
                2..=14 => ActionParam::Literal(arg),
                _ => return Err(Error::CorruptBlock(format!("unknown action parameter type {}", ty))),
            });
        }
        // unused parameter slots hold 1-byte "0" strings, 5 bytes each
        cur.skip((MAX_PARAMS - param_count) * 5)?;
        let invert_condition = cur.read_bool()?;

        Ok(CodeAction {
            lib_id,
            id,
            action_kind,
            can_be_relative,
            is_question,
            applies_to_something,
            execution_type,
            applies_to,
            is_relative,
            invert_condition,
            params,
        })
    }

    /// The code handles registered for this action, in parameter order.
    pub fn handles(&self) -> impl Iterator<Item = CodeHandle> + '_ {
        self.params.iter().filter_map(|param| match param {
            ActionParam::Expression(handle) | ActionParam::Code(handle) => Some(*handle),
            ActionParam::Literal(_) => None,
        })
    }

    /// Reads a counted list of actions (the layout used by events and
    /// timeline moments: a version dword, a count, then the actions).
    pub fn read_list(cur: &mut DataCursor, registry: &mut dyn CodeRegistry) -> Result<Vec<Self>, Error> {
        cur.skip(4)?; // data version, 400
        let count = cur.read_u32()? as usize;
        let mut actions = Vec::with_capacity(count.min(cur.remaining() / 4));
        for _ in 0..count {
            actions.push(CodeAction::deserialize(cur, registry)?);
        }
        Ok(actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::NullRegistry;

    fn dword(buf: &mut Vec<u8>, x: u32) {
        buf.extend_from_slice(&x.to_le_bytes());
    }

    fn pas(buf: &mut Vec<u8>, s: &[u8]) {
        dword(buf, s.len() as u32);
        buf.extend_from_slice(s);
    }

    /// An "execute code" action with one code and one expression parameter,
    /// laid out exactly as the packager writes it.
    fn execute_code_action() -> Vec<u8> {
        let mut raw = Vec::new();
        dword(&mut raw, 440); // data version
        dword(&mut raw, 1); // library id
        dword(&mut raw, 603); // action id
        dword(&mut raw, 7); // kind: code
        dword(&mut raw, 0); // can be relative
        dword(&mut raw, 0); // is question
        dword(&mut raw, 1); // applies to something
        dword(&mut raw, 2); // execution type: code
        pas(&mut raw, b""); // built-in function name
        pas(&mut raw, b""); // built-in function body
        dword(&mut raw, 2); // used parameters
        dword(&mut raw, 440);
        for ty in [1u32, 0, 0, 0, 0, 0, 0, 0] {
            dword(&mut raw, ty);
        }
        raw.extend_from_slice(&(-1i32).to_le_bytes()); // applies to self
        dword(&mut raw, 0); // relative
        dword(&mut raw, 440);
        pas(&mut raw, b"x = 1");
        pas(&mut raw, b"x > 0");
        for _ in 0..6 {
            pas(&mut raw, b"0"); // unused parameter slots
        }
        dword(&mut raw, 0); // invert condition
        raw
    }

    #[test]
    fn ground_truth_record() {
        let raw = execute_code_action();
        let mut registry = NullRegistry::default();
        let mut cur = DataCursor::new(&raw);
        let action = CodeAction::deserialize(&mut cur, &mut registry).unwrap();

        assert_eq!(cur.remaining(), 0, "record must be consumed exactly");
        assert_eq!(action.lib_id, 1);
        assert_eq!(action.id, 603);
        assert_eq!(action.action_kind, 7);
        assert!(!action.can_be_relative);
        assert!(!action.is_question);
        assert!(action.applies_to_something);
        assert_eq!(action.execution_type, 2);
        assert_eq!(action.applies_to, -1);
        assert!(!action.is_relative);
        assert!(!action.invert_condition);

        assert_eq!(action.params.len(), 2);
        assert!(matches!(action.params[0], ActionParam::Code(_)));
        assert!(matches!(action.params[1], ActionParam::Expression(_)));
        assert_eq!(registry.sources[0].as_ref(), b"x = 1");
        assert_eq!(registry.sources[1].as_ref(), b"x > 0");
        assert_eq!(action.handles().count(), 2);
    }

    #[test]
    fn too_many_parameters_is_an_error() {
        let mut raw = execute_code_action();
        // the used-parameter count sits after the 8-dword prefix and the two
        // empty built-in strings
        let count_at = 8 * 4 + 4 + 4;
        raw[count_at..count_at + 4].copy_from_slice(&9u32.to_le_bytes());
        let mut registry = NullRegistry::default();
        let result = CodeAction::deserialize(&mut DataCursor::new(&raw), &mut registry);
        assert!(matches!(result, Err(Error::CorruptBlock(_))));
    }
}
