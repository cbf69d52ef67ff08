// Estructuras de datos principales

pub mod flatten;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use flatten::flatten;

/// Hijos de un nodo, únicos por nombre, iterados en orden de creación.
///
/// La búsqueda pasa por un índice de nombres: un upsert es O(1) y no un
/// recorrido lineal sobre los hermanos.
#[derive(Debug, Clone)]
pub struct NamedChildren<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for NamedChildren<T> {
    fn default() -> Self {
        NamedChildren { items: Vec::new(), index: HashMap::new() }
    }
}

impl<T> NamedChildren<T> {
    /// Devuelve el hijo llamado `name`; lo crea con `make` la primera vez.
    pub fn get_or_insert_with(&mut self, name: &str, make: impl FnOnce() -> T) -> &mut T {
        let idx = match self.index.get(name) {
            Some(&i) => i,
            None => {
                self.items.push(make());
                let i = self.items.len() - 1;
                self.index.insert(name.to_string(), i);
                i
            }
        };
        &mut self.items[idx]
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&i| &self.items[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// Total de un nivel: lo fija una fila de cabecera o se suma desde los hijos.
///
/// El valor de cabecera reemplaza lo que hubiera (gana la última escritura) y
/// los aportes de los hijos siempre se suman, también después de un reemplazo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TotalCell {
    value: i64,
    overridden: bool,
}

impl TotalCell {
    pub fn override_with(&mut self, total: i64) {
        self.value = total;
        self.overridden = true;
    }

    pub fn accumulate(&mut self, missed: i64) {
        self.value += missed;
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }
}

// ---------------------------------------------------------------------------
// Árbol del registro de asistencia

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub date: NaiveDate,
    pub missed: i64,
}

#[derive(Debug, Clone)]
pub struct StudentNode {
    pub name: String,
    pub events: Vec<AttendanceEvent>,
}

#[derive(Debug, Clone)]
pub struct GroupNode {
    pub name: String,
    pub students: NamedChildren<StudentNode>,
}

#[derive(Debug, Clone)]
pub struct DepartmentNode {
    pub name: String,
    pub groups: NamedChildren<GroupNode>,
}

/// Resultado en memoria de leer un registro de asistencia.
#[derive(Debug, Clone, Default)]
pub struct AttendanceTree {
    pub departments: NamedChildren<DepartmentNode>,
}

impl AttendanceTree {
    /// Agrega un evento bajo departamento → grupo → estudiante, creando nodos si faltan.
    pub fn record(&mut self, department: &str, group: &str, student: &str, event: AttendanceEvent) {
        let dept = self.departments.get_or_insert_with(department, || DepartmentNode {
            name: department.to_string(),
            groups: NamedChildren::default(),
        });
        let grp = dept.groups.get_or_insert_with(group, || GroupNode {
            name: group.to_string(),
            students: NamedChildren::default(),
        });
        let stu = grp.students.get_or_insert_with(student, || StudentNode {
            name: student.to_string(),
            events: Vec::new(),
        });
        stu.events.push(event);
    }

    pub fn event_count(&self) -> usize {
        self.departments
            .iter()
            .flat_map(|d| d.groups.iter())
            .flat_map(|g| g.students.iter())
            .map(|s| s.events.len())
            .sum()
    }

    /// Convierte a los documentos JSON publicados.
    pub fn into_documents(self) -> Vec<DepartmentDoc> {
        self.departments
            .into_vec()
            .into_iter()
            .map(|d| DepartmentDoc {
                department: d.name,
                groups: d
                    .groups
                    .into_vec()
                    .into_iter()
                    .map(|g| GroupDoc {
                        group: g.name,
                        students: g
                            .students
                            .into_vec()
                            .into_iter()
                            .map(|s| StudentDoc { student: s.name, attendance: s.events })
                            .collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Árbol de la ведомость (resumen)

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StudentTotals {
    pub missed_total: i64,
    pub missed_bad: i64,
    pub missed_excused: i64,
}

#[derive(Debug, Clone)]
pub struct SummaryStudentNode {
    pub name: String,
    pub totals: StudentTotals,
}

#[derive(Debug, Clone)]
pub struct SummaryGroupNode {
    pub name: String,
    pub total: TotalCell,
    pub students: NamedChildren<SummaryStudentNode>,
}

#[derive(Debug, Clone)]
pub struct SpecialtyNode {
    pub name: String,
    pub total: TotalCell,
    pub groups: NamedChildren<SummaryGroupNode>,
}

#[derive(Debug, Clone)]
pub struct SummaryDepartmentNode {
    pub name: String,
    pub total: TotalCell,
    pub specialties: NamedChildren<SpecialtyNode>,
}

#[derive(Debug, Clone, Default)]
pub struct StatementTree {
    pub departments: NamedChildren<SummaryDepartmentNode>,
}

impl StatementTree {
    pub fn department_mut(&mut self, name: &str) -> &mut SummaryDepartmentNode {
        self.departments.get_or_insert_with(name, || SummaryDepartmentNode {
            name: name.to_string(),
            total: TotalCell::default(),
            specialties: NamedChildren::default(),
        })
    }

    pub fn into_documents(self) -> Vec<SummaryDepartmentDoc> {
        self.departments
            .into_vec()
            .into_iter()
            .map(|d| SummaryDepartmentDoc {
                department: d.name,
                total_missed: d.total.value(),
                specialties: d
                    .specialties
                    .into_vec()
                    .into_iter()
                    .map(|s| SpecialtyDoc {
                        specialty: s.name,
                        total_missed: s.total.value(),
                        groups: s
                            .groups
                            .into_vec()
                            .into_iter()
                            .map(|g| SummaryGroupDoc {
                                group: g.name,
                                total_missed: g.total.value(),
                                students: g
                                    .students
                                    .into_vec()
                                    .into_iter()
                                    .map(|st| SummaryStudentDoc {
                                        student: st.name,
                                        missed_total: st.totals.missed_total,
                                        missed_bad: st.totals.missed_bad,
                                        missed_excused: st.totals.missed_excused,
                                    })
                                    .collect(),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect()
    }
}

impl SpecialtyNode {
    pub fn new(name: &str) -> Self {
        SpecialtyNode { name: name.to_string(), total: TotalCell::default(), groups: NamedChildren::default() }
    }
}

impl SummaryGroupNode {
    pub fn new(name: &str) -> Self {
        SummaryGroupNode { name: name.to_string(), total: TotalCell::default(), students: NamedChildren::default() }
    }
}

// ---------------------------------------------------------------------------
// Documentos publicados (attendance.json / summary.json)

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDoc {
    pub student: String,
    pub attendance: Vec<AttendanceEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDoc {
    pub group: String,
    pub students: Vec<StudentDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentDoc {
    pub department: String,
    pub groups: Vec<GroupDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStudentDoc {
    pub student: String,
    pub missed_total: i64,
    pub missed_bad: i64,
    pub missed_excused: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryGroupDoc {
    pub group: String,
    pub total_missed: i64,
    pub students: Vec<SummaryStudentDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyDoc {
    pub specialty: String,
    pub total_missed: i64,
    pub groups: Vec<SummaryGroupDoc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDepartmentDoc {
    pub department: String,
    pub total_missed: i64,
    pub specialties: Vec<SpecialtyDoc>,
}

/// Un evento de asistencia con su linaje completo; la unidad de toda consulta.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlatRecord {
    pub department: String,
    pub group: String,
    pub student: String,
    /// ISO `YYYY-MM-DD`; los filtros lo comparan como texto.
    pub date: String,
    pub missed: i64,
}
