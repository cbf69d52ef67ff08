use log::warn;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::models::FlatRecord;

/// Grupo cuyo promedio de horas faltadas por estudiante alcanzó el umbral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupAlert {
    pub group: String,
    pub students: usize,
    pub missed_total: i64,
    /// Promedio entero, truncado.
    pub average: i64,
    pub threshold: i64,
}

/// Agrupa por nombre de grupo y avisa cuando el promedio por estudiante supera el umbral.
///
/// La clave es solo el nombre del grupo: grupos homónimos de distintos
/// departamentos se juntan.
pub fn check_alerts(records: &[FlatRecord], threshold: i64) -> Vec<GroupAlert> {
    let mut missed: BTreeMap<&str, i64> = BTreeMap::new();
    let mut students: BTreeMap<&str, HashSet<&str>> = BTreeMap::new();
    for rec in records {
        *missed.entry(&rec.group).or_default() += rec.missed;
        students.entry(&rec.group).or_default().insert(&rec.student);
    }

    let mut alerts = Vec::new();
    for (group, total) in missed {
        let n = students.get(group).map_or(0, HashSet::len);
        if n == 0 {
            continue;
        }
        let average = total / n as i64;
        if average >= threshold {
            warn!(
                "group {} over absence threshold: mean {} h per student (threshold {})",
                group, average, threshold
            );
            alerts.push(GroupAlert {
                group: group.to_string(),
                students: n,
                missed_total: total,
                average,
                threshold,
            });
        }
    }
    alerts
}
