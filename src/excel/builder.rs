//! Esqueleto común: clasificar → contextualizar → insertar.
//!
//! Ambas familias de hojas se leen igual: cada fila se clasifica sola, la
//! clasificación avanza un pequeño contexto de "dónde estamos" y un upsert
//! propio del formato coloca la fila en el árbol. Entre el registro y la
//! ведомость solo cambian el clasificador y el upsert.

use log::debug;

use crate::excel::classify::{ClassifiedRow, RowClassifier, RowKind};

/// Último departamento / especialidad / grupo / estudiante visto al recorrer la hoja.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseContext {
    pub department: Option<String>,
    pub specialty: Option<String>,
    pub group: Option<String>,
    pub student: Option<String>,
}

impl ParseContext {
    /// Contexto después de una fila del tipo dado.
    ///
    /// Un nivel reinicia todos los de abajo; las filas de datos, de cabecera y
    /// desconocidas no tocan el contexto.
    pub fn advance(&self, kind: &RowKind) -> ParseContext {
        match kind {
            RowKind::Department(name) => ParseContext {
                department: Some(name.clone()),
                ..ParseContext::default()
            },
            RowKind::Specialty(name) => ParseContext {
                department: self.department.clone(),
                specialty: Some(name.clone()),
                group: None,
                student: None,
            },
            RowKind::Group(name) => ParseContext {
                department: self.department.clone(),
                specialty: self.specialty.clone(),
                group: Some(name.clone()),
                student: None,
            },
            RowKind::Student(name) => ParseContext {
                student: Some(name.clone()),
                ..self.clone()
            },
            RowKind::Attendance { .. } | RowKind::Header | RowKind::Unknown => self.clone(),
        }
    }
}

/// Una familia de hojas: cómo clasificar sus filas y dónde ponerlas.
pub trait SheetLayout {
    type Output;

    fn classifier(&self) -> RowClassifier;

    /// Coloca una fila clasificada; `ctx` ya refleja esta fila.
    fn upsert(&mut self, ctx: &ParseContext, row: &ClassifiedRow);

    fn finish(self) -> Self::Output;
}

/// Aplica un formato a toda la hoja, de arriba a abajo.
pub fn build_tree<L: SheetLayout>(mut layout: L, rows: &[Vec<String>]) -> L::Output {
    let classifier = layout.classifier();
    let mut ctx = ParseContext::default();

    for (idx, cells) in rows.iter().enumerate() {
        if cells.is_empty() {
            continue;
        }
        let row = classifier.classify(cells);
        if matches!(row.kind, RowKind::Header | RowKind::Unknown) {
            continue;
        }
        ctx = ctx.advance(&row.kind);
        debug!("row {}: {} ({:?})", idx + 1, row.kind.name(), ctx);
        layout.upsert(&ctx, &row);
    }

    layout.finish()
}
