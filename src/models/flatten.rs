use crate::models::{DepartmentDoc, FlatRecord};

/// Una fila plana por evento, con su linaje completo.
///
/// Recorre departamento → grupo → estudiante → evento en profundidad y conserva
/// el orden del documento. Quien compare resultados no debe depender de ese orden.
pub fn flatten(departments: &[DepartmentDoc]) -> Vec<FlatRecord> {
    let mut out = Vec::new();
    for d in departments {
        for g in &d.groups {
            for s in &g.students {
                for a in &s.attendance {
                    out.push(FlatRecord {
                        department: d.department.clone(),
                        group: g.group.clone(),
                        student: s.student.clone(),
                        date: a.date.format("%Y-%m-%d").to_string(),
                        missed: a.missed,
                    });
                }
            }
        }
    }
    out
}
