use thiserror::Error;

use crate::{error::ParseError, interpreter::value::Value};

/// Represents all host errors that can occur during evaluation.
///
/// Messages are plain descriptions. Each block frame an error crosses adds
/// its line to `AtLine`, so the rendered message accumulates one `(line N)`
/// suffix per frame.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Tried to use an undefined variable.
    #[error("unknown variable '{name}'")]
    UnknownVariable {
        /// The name of the variable.
        name: String,
    },
    /// A declaration reused a name already declared in the same scope.
    #[error("variable '{name}' already exists in scope, reassign with \"{name} = {value}\"")]
    Redeclaration {
        /// The name of the variable.
        name:  String,
        /// The rendered value the declaration tried to bind.
        value: String,
    },
    /// A declared or parameter type rejected the bound value.
    #[error("type {expected} on variable '{name}' does not satisfy {value}")]
    BindingTypeMismatch {
        /// The name of the binding.
        name:     String,
        /// The rendered declared type.
        expected: String,
        /// The rendered value.
        value:    String,
    },
    /// Assignment to a binding declared with `let`.
    #[error("cannot assign to immutable variable '{name}'")]
    ImmutableAssignment {
        /// The name of the binding.
        name: String,
    },
    /// A reassignment did not satisfy the binding's declared type.
    #[error("reassignment of '{name}' with {value} does not satisfy its type {expected}")]
    AssignmentTypeMismatch {
        /// The name of the binding.
        name:     String,
        /// The rendered value.
        value:    String,
        /// The rendered declared type.
        expected: String,
    },
    /// The target of an assignment is not assignable.
    #[error("invalid assignment target")]
    InvalidAssignmentTarget,
    /// An assignment to `a::b`.
    #[error("cannot assign to namespaces")]
    NamespaceAssignment,
    /// Called a function with the wrong number of arguments.
    #[error("expected function signature {signature} when calling, got ({arguments})")]
    SignatureMismatch {
        /// The rendered signature of the callee.
        signature: String,
        /// The rendered arguments.
        arguments: String,
    },
    /// A function returned a value that does not satisfy its return type.
    #[error("function return {value} does not satisfy expected return type {expected} (line {line})")]
    ReturnTypeMismatch {
        /// The rendered returned value.
        value:    String,
        /// The rendered return type.
        expected: String,
        /// The line of the last statement executed by the body.
        line:     usize,
    },
    /// Called a value that is not a function.
    #[error("{value} is not callable")]
    NotCallable {
        /// The rendered callee.
        value: String,
    },
    /// `brk` or `cnt` outside the body of a loop.
    #[error("can only use '{keyword}' inside whl & for loops")]
    IllegalControlFlow {
        /// The offending keyword.
        keyword: &'static str,
    },
    /// `for` over something that is not an array or object.
    #[error("cannot iterate over {value}")]
    NotIterable {
        /// The rendered value.
        value: String,
    },
    /// `Name{...}` where `Name` is not a struct.
    #[error("{name}{{...}} syntax can only build a struct, {name} is not one")]
    NotAStruct {
        /// The name used in the literal.
        name: String,
    },
    /// Struct literal keys must be bare field names.
    #[error("{name}{{...}} fields must be plain identifiers")]
    StructKeyNotIdentifier {
        /// The struct name.
        name: String,
    },
    /// A field not declared on the struct.
    #[error("{owner} has no field '{field}'")]
    UnknownField {
        /// The struct name.
        owner: String,
        /// The missing field.
        field: String,
    },
    /// A struct field rejected its value.
    #[error("field '{field}' of type {expected} does not satisfy {value}")]
    FieldTypeMismatch {
        /// The field name.
        field:    String,
        /// The rendered field type.
        expected: String,
        /// The rendered value.
        value:    String,
    },
    /// A struct literal named too few or too many fields.
    #[error("{name} expects {expected} fields, got {found}")]
    FieldCountMismatch {
        /// The struct name.
        name:     String,
        /// The declared field count.
        expected: usize,
        /// The given field count.
        found:    usize,
    },
    /// A plain variant that the tag does not declare.
    #[error("tag {tag} has no plain variant {variant}")]
    UnknownPlainVariant {
        /// The tag name.
        tag:     String,
        /// The variant name.
        variant: String,
    },
    /// A payload variant that the tag does not declare.
    #[error("tag {tag} has no payload variant {variant}")]
    UnknownPayloadVariant {
        /// The tag name.
        tag:     String,
        /// The variant name.
        variant: String,
    },
    /// A payload variant was constructed with a value of the wrong type.
    #[error("variant {variant} expects a payload of type {expected}, got {value}")]
    PayloadTypeMismatch {
        /// The variant name.
        variant:  String,
        /// The rendered payload type.
        expected: String,
        /// The rendered payload value.
        value:    String,
    },
    /// Payload variants take exactly one argument.
    #[error("variant {variant} takes exactly one payload, got {found}")]
    PayloadArity {
        /// The variant name.
        variant: String,
        /// The given argument count.
        found:   usize,
    },
    /// A pointer write that breaks the pointer's stamp.
    #[error("cannot store {value} through a pointer stamped {expected}")]
    PointerTypeMismatch {
        /// The rendered stamp.
        expected: String,
        /// The rendered value.
        value:    String,
    },
    /// An arena index that lies past the end of the arena.
    #[error("pointer address {index} is out of range")]
    PointerOutOfRange {
        /// The requested address.
        index: f64,
    },
    /// `receiver:method()` where the receiver has no such method.
    #[error("{receiver} has no method '{name}'")]
    UnknownMethod {
        /// The rendered receiver.
        receiver: String,
        /// The method name.
        name:     String,
    },
    /// `a:b` used anywhere but directly in call position.
    #[error("'{name}' can only be accessed with ':' when called")]
    CallSelfOutsideCall {
        /// The method name.
        name: String,
    },
    /// A `use` path that names nothing.
    #[error("couldn't find {name} on namespace")]
    UseNotFound {
        /// The missing name.
        name: String,
    },
    /// A `use` path that walks through something other than a namespace.
    #[error("{name} is not a namespace")]
    NotANamespace {
        /// The offending name.
        name: String,
    },
    /// `ext` was given something other than a string.
    #[error("ext expects a file path string, got {value}")]
    ExpectedIncludePath {
        /// The rendered value.
        value: String,
    },
    /// A file that includes itself, directly or through other files.
    #[error("cyclic include of {path}")]
    CyclicInclude {
        /// The file path.
        path: String,
    },
    /// Includes nested deeper than the configured maximum.
    #[error("includes nested deeper than {depth} files")]
    IncludeDepthExceeded {
        /// The configured maximum.
        depth: usize,
    },
    /// The source loader could not read a file.
    #[error("couldn't read {path}: {message}")]
    Io {
        /// The file path.
        path:    String,
        /// The loader's message.
        message: String,
    },
    /// An included file failed to parse.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// A failure inside an included file.
    #[error("{source} (in file {path}, externally included at line {line})")]
    Included {
        /// The included file.
        path:   String,
        /// The line of the `ext` expression.
        line:   usize,
        /// The failure inside the file.
        source: Box<RuntimeError>,
    },
    /// An array write past the end of the array.
    #[error("index {index} is out of range for an array of length {len}")]
    IndexOutOfRange {
        /// The rendered index.
        index: String,
        /// The array length.
        len:   usize,
    },
    /// Function calls nested deeper than the configured limit.
    #[error("maximum call depth exceeded (limit: {depth})")]
    StackOverflow {
        /// The configured limit.
        depth: usize,
    },
    /// The configured loop iteration limit was reached.
    #[error("loop iteration limit of {limit} reached")]
    IterationLimit {
        /// The configured limit.
        limit: u64,
    },
    /// `assert` received a falsey value.
    #[error("assertion failed: {value}")]
    AssertionFailed {
        /// The rendered value.
        value: String,
    },
    /// A native function rejected its arguments.
    #[error("{name}: {details}")]
    NativeArguments {
        /// The native's name.
        name:    String,
        /// What was wrong.
        details: String,
    },
    /// An operand of the wrong kind.
    #[error("{details}")]
    TypeError {
        /// Description of the mismatch.
        details: String,
    },
    /// A failure annotated with the lines of the statements it crossed,
    /// innermost first.
    #[error("{source}{frames}", frames = line_frames(.lines))]
    AtLine {
        /// The wrapped failure.
        source: Box<RuntimeError>,
        /// The statement lines.
        lines:  Vec<usize>,
    },
}

fn line_frames(lines: &[usize]) -> String {
    lines.iter().map(|line| format!(" (line {line})")).collect()
}

impl RuntimeError {
    /// Builds a `TypeError` from anything displayable.
    pub fn type_error(details: impl Into<String>) -> Self {
        Self::TypeError { details: details.into() }
    }

    /// Strips every line and include annotation, returning the innermost
    /// failure.
    pub fn root(&self) -> &RuntimeError {
        match self {
            Self::AtLine { source, .. } | Self::Included { source, .. } => source.root(),
            other => other,
        }
    }
}

/// The outcome of evaluation when it does not produce a value.
///
/// `Raised` carries a script exception thrown with `err`; scripts can catch
/// it with `cat`. `Host` is an interpreter failure that no script can
/// intercept.
#[derive(Debug, Error)]
pub enum EvalError {
    /// A value raised with `err`.
    #[error("{0}")]
    Raised(Value),
    /// An interpreter failure.
    #[error(transparent)]
    Host(#[from] RuntimeError),
}

impl EvalError {
    /// Appends a `(line N)` frame to host failures. Raised values pass
    /// through untouched.
    #[must_use]
    pub fn at_line(self, line: usize) -> Self {
        match self {
            Self::Host(RuntimeError::AtLine { source, mut lines }) => {
                lines.push(line);
                Self::Host(RuntimeError::AtLine { source, lines })
            },
            Self::Host(source) => Self::Host(RuntimeError::AtLine { source: Box::new(source),
                                                                    lines:  vec![line], }),
            raised => raised,
        }
    }

    /// Marks a failure as coming from an included file.
    #[must_use]
    pub fn included(self, path: &str, line: usize) -> Self {
        match self {
            Self::Host(source) => Self::Host(RuntimeError::Included { path: path.to_string(),
                                                                      line,
                                                                      source: Box::new(source) }),
            raised => raised,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn line_frames_accumulate() {
        let err = EvalError::from(RuntimeError::UnknownVariable { name: "x".into() }).at_line(3)
                                                                                     .at_line(7);
        assert_eq!(err.to_string(), "unknown variable 'x' (line 3) (line 7)");
    }

    #[test]
    fn deep_line_frames_stay_flat() {
        let mut err = EvalError::from(RuntimeError::StackOverflow { depth: 10 });
        for line in 0..50_000 {
            err = err.at_line(line);
        }
        let EvalError::Host(RuntimeError::AtLine { source, lines }) = &err else {
            panic!("expected line frames")
        };
        assert!(matches!(**source, RuntimeError::StackOverflow { depth: 10 }));
        assert_eq!(lines.len(), 50_000);
        assert!(err.to_string().starts_with("maximum call depth exceeded (limit: 10) (line 0) (line 1)"));
    }

    #[test]
    fn root_skips_annotations() {
        let err = EvalError::from(RuntimeError::IterationLimit { limit: 5 }).at_line(2)
                                                                            .included("lib.nk", 4);
        let EvalError::Host(host) = err else { panic!("expected a host error") };
        assert!(matches!(host.root(), RuntimeError::IterationLimit { limit: 5 }));
        assert_eq!(host.to_string(),
                   "loop iteration limit of 5 reached (line 2) (in file lib.nk, externally included at line 4)");
    }
}
