//! Built-in example programs and the CFPL quick reference.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub id: &'static str,
    pub title: &'static str,
    pub code: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown example: {0}")]
    UnknownExample(String),
}

const EXAMPLES: &[Example] = &[
    Example {
        id: "input",
        title: "Basic variable declaration and output example",
        code: r##"** Sample CFPL Program
VAR abc, b, c AS INT
VAR x='_', w_23='w' AS CHAR
VAR t=TRUE AS BOOL

START
    abc=b=10
    w_23='a'
    ** this is a comment
    OUTPUT: abc & "hi" & b & # & w_23 & "#"
STOP"##,
    },
    Example {
        id: "conditions",
        title: "Conditional statements and decision making",
        code: r##"** Conditional Example
VAR age AS INT
VAR message AS CHAR

START
    INPUT: age
    IF (age < 18)
    START
        message = "Too young to vote"
    STOP
    ELSE
    START
        message = "You can vote!"
    STOP

    OUTPUT: "Age: " & age & #
    OUTPUT: message
STOP"##,
    },
    Example {
        id: "loops",
        title: "Loop structures for repetitive operations",
        code: r##"** Loop Example
VAR i, sum AS INT
VAR result AS CHAR

START
    sum = 0
    i = 1
    result = "The sum is now: "

    WHILE (i <= 5) START
        OUTPUT: "Sum:" & sum
        sum = sum + i
        OUTPUT: "Adding " & i & # & result & sum & #
        i = i + 1
    STOP

    OUTPUT: "Final sum: " & sum & #
STOP"##,
    },
];

/// Read-only example registry plus the "current" selection shown in the example pane.
#[derive(Debug, Clone)]
pub struct Catalog {
    examples: &'static [Example],
    current: usize,
}

impl Default for Catalog {
    fn default() -> Self {
        Self { examples: EXAMPLES, current: 0 }
    }
}

impl Catalog {
    /// Starts on `id` when it exists, otherwise on the first example.
    pub fn with_selection(id: &str) -> Self {
        let mut catalog = Self::default();
        if catalog.switch_example(id).is_err() {
            tracing::warn!(example = id, "unknown default example, using first entry");
        }
        catalog
    }

    pub fn examples(&self) -> &[Example] {
        self.examples
    }

    pub fn get(&self, id: &str) -> Option<&Example> {
        self.examples.iter().find(|e| e.id == id)
    }

    pub fn current(&self) -> &Example {
        &self.examples[self.current]
    }

    /// Changes which example is displayed. Never touches the editor buffer.
    pub fn switch_example(&mut self, id: &str) -> Result<&Example, CatalogError> {
        let index = self
            .examples
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CatalogError::UnknownExample(id.to_string()))?;
        self.current = index;
        Ok(&self.examples[index])
    }

    pub fn select_next(&mut self) -> &Example {
        self.current = (self.current + 1) % self.examples.len();
        self.current()
    }

    pub fn select_previous(&mut self) -> &Example {
        self.current = (self.current + self.examples.len() - 1) % self.examples.len();
        self.current()
    }
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub const LANGUAGE_REFERENCE: &str = r#"# CFPL Quick Reference

## Program layout
Declarations come first, then one `START` ... `STOP` block.
Lines starting with `**` are comments.

## Declarations
- `VAR a, b=5 AS INT`
- `VAR ratio=0.5 AS FLOAT`
- `VAR c='x' AS CHAR`
- `VAR done=FALSE AS BOOL`

## Statements
- Assignment: `x = y = 10`
- Output: `OUTPUT: a & "text" & #` (`&` concatenates, `#` is a newline)
- Input: `INPUT: a, b` reads comma separated values from the input field
- Conditional: `IF (cond) START ... STOP ELSE START ... STOP`
- Loop: `WHILE (cond) START ... STOP`

## Operators
- Arithmetic: `+ - * / %`
- Comparison: `> < >= <= == <>`
- Logical: `AND OR NOT`

## String escapes
- `[#]` newline, `[[` literal `[`, `]]` literal `]`
"#;
