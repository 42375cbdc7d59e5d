//! Diagnostics
//!
//! Collects warnings and errors raised while resolving and emitting schemas.
//! Recoverable problems (a missing `$ref` target, an inexpressible property
//! name) are reported here instead of aborting the run.

use std::fmt;

use super::SchemaId;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCode {
    // === Resolution ===
    /// $ref target not found in the intake mapping
    UnresolvedRef,
    /// Schema references itself through a chain of $refs
    CyclicSchema,

    // === Emission ===
    /// Property name contains brackets, no override method generated
    BracketedProperty,
    /// Property name has no alphanumeric characters
    EmptyMethodName,
    /// Two properties derive the same override method name
    MethodNameCollision,
    /// Two entries derive the same type name
    TypeNameCollision,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnresolvedRef => "W001",
            Self::CyclicSchema => "E001",
            Self::BracketedProperty => "I001",
            Self::EmptyMethodName => "W002",
            Self::MethodNameCollision => "W003",
            Self::TypeNameCollision => "W004",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::CyclicSchema => Severity::Error,
            Self::UnresolvedRef
            | Self::EmptyMethodName
            | Self::MethodNameCollision
            | Self::TypeNameCollision => Severity::Warning,
            Self::BracketedProperty => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticItem {
    /// Entry that caused this diagnostic
    pub schema_id: SchemaId,
    pub code: DiagnosticCode,
    pub message: String,
    /// Additional context (property names, reference chains)
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(schema_id: impl Into<SchemaId>, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            schema_id: schema_id.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.schema_id
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    /// Add diagnostic for a missing $ref target
    pub fn unresolved_ref(&mut self, schema_id: impl Into<SchemaId>, ref_target: &str) {
        self.push(DiagnosticItem::new(
            schema_id,
            DiagnosticCode::UnresolvedRef,
            format!("Reference not found for {}", ref_target),
        ));
    }

    /// Add diagnostic for a reference under a keyword that is not followed
    pub fn unfollowed_ref(&mut self, schema_id: impl Into<SchemaId>, keyword: &str, ref_target: &str) {
        self.push(
            DiagnosticItem::new(
                schema_id,
                DiagnosticCode::UnresolvedRef,
                format!("Reference under {} left in place: {}", keyword, ref_target),
            )
            .with_context(format!("Keyword: {}", keyword)),
        );
    }

    /// Add diagnostic for a property that gets no override method
    pub fn skipped_property(
        &mut self,
        schema_id: impl Into<SchemaId>,
        code: DiagnosticCode,
        property: &str,
    ) {
        self.push(
            DiagnosticItem::new(
                schema_id,
                code,
                format!("No override method generated for property '{}'", property),
            )
            .with_context(format!("Property: {}", property)),
        );
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Warning)
    }

    /// Items carrying a given code
    pub fn with_code(&self, code: DiagnosticCode) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(move |i| i.code == code)
    }

    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Merge another Diagnostics into this one
    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }

    /// Format all diagnostics for display
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }

        if !self.is_empty() {
            output.push_str(&format!("\n{} warning(s)\n", self.warning_count()));
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl IntoIterator for Diagnostics {
    type Item = DiagnosticItem;
    type IntoIter = std::vec::IntoIter<DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_severity() {
        assert_eq!(DiagnosticCode::CyclicSchema.severity(), Severity::Error);
        assert_eq!(DiagnosticCode::UnresolvedRef.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::BracketedProperty.severity(), Severity::Info);
    }

    #[test]
    fn test_diagnostics_collection() {
        let mut diags = Diagnostics::new();
        diags.unresolved_ref("PetSchema", "#/components/schemas/Owner");
        diags.skipped_property("PetSchema", DiagnosticCode::BracketedProperty, "tags[]");

        assert_eq!(diags.len(), 2);
        assert_eq!(diags.warning_count(), 1);
        assert!(!diags.has_errors());
        assert_eq!(diags.with_code(DiagnosticCode::BracketedProperty).count(), 1);
    }

    #[test]
    fn test_display_includes_context() {
        let item = DiagnosticItem::new("Pet", DiagnosticCode::MethodNameCollision, "collision")
            .with_context("first_name")
            .with_context("firstName");
        let text = item.to_string();
        assert!(text.starts_with("[W003] warning: collision (Pet)"));
        assert!(text.contains("\n  - firstName"));
    }
}
