//! Result assembly: committed pairings + leftovers → ordered output rows and summary.

use crate::error::ReconError;
use crate::model::{
    MatchOutput, MatchStatus, MovementView, NormalizedMovement, Pairing, RawMovement,
    Reconciliation, ReconciliationRow, ReconSummary,
};

/// One side of the input: raw records and their normalized forms, same order.
#[derive(Clone, Copy)]
pub struct Side<'a> {
    pub raw: &'a [RawMovement],
    pub normalized: &'a [NormalizedMovement],
}

/// Shape the match output into rows.
///
/// Order: paired rows by statement position, then statement-only rows, then
/// accounting-only rows, each in input order. Fails if any input record would
/// appear zero or several times.
pub fn assemble(
    statement: Side<'_>,
    accounting: Side<'_>,
    output: &MatchOutput,
) -> Result<Reconciliation, ReconError> {
    let mut pairs: Vec<&Pairing> = output.pairs.iter().collect();
    pairs.sort_by_key(|p| p.statement);

    let mut rows = Vec::with_capacity(
        pairs.len() + output.statement_only.len() + output.accounting_only.len(),
    );

    for p in pairs {
        rows.push(ReconciliationRow {
            statement: Some(view(statement, p.statement)?),
            accounting: Some(view(accounting, p.accounting)?),
            status: p.status,
            observation: paired_observation(p),
            similarity: Some(p.score),
            day_offset: Some(p.day_offset),
        });
    }

    for &si in &output.statement_only {
        rows.push(ReconciliationRow {
            statement: Some(view(statement, si)?),
            accounting: None,
            status: MatchStatus::Unmatched,
            observation: missing_observation(
                "no counterpart found in accounting records",
                &statement.normalized[si],
            ),
            similarity: None,
            day_offset: None,
        });
    }

    for &ai in &output.accounting_only {
        rows.push(ReconciliationRow {
            statement: None,
            accounting: Some(view(accounting, ai)?),
            status: MatchStatus::Unmatched,
            observation: missing_observation(
                "no counterpart found in statement records",
                &accounting.normalized[ai],
            ),
            similarity: None,
            day_offset: None,
        });
    }

    check_conservation(&rows, statement.raw.len(), accounting.raw.len())?;

    let summary = compute_summary(&rows, statement.raw.len(), accounting.raw.len());
    Ok(Reconciliation { summary, rows })
}

/// Per-status counts over assembled rows.
pub fn compute_summary(
    rows: &[ReconciliationRow],
    statement_total: usize,
    accounting_total: usize,
) -> ReconSummary {
    let mut summary = ReconSummary {
        statement_total,
        accounting_total,
        ..ReconSummary::default()
    };
    for row in rows {
        match (row.status, &row.statement, &row.accounting) {
            (MatchStatus::Matched, ..) => summary.matched += 1,
            (MatchStatus::Probable, ..) => summary.probable += 1,
            (MatchStatus::Unmatched, Some(_), _) => summary.statement_only += 1,
            (MatchStatus::Unmatched, None, _) => summary.accounting_only += 1,
        }
    }
    summary
}

fn view(side: Side<'_>, index: usize) -> Result<MovementView, ReconError> {
    let (Some(raw), Some(norm)) = (side.raw.get(index), side.normalized.get(index)) else {
        return Err(ReconError::UnexpectedProcessing(format!(
            "record index {index} out of range"
        )));
    };
    Ok(MovementView {
        index,
        date: norm
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| raw.date_text.trim().to_string()),
        description: raw.description_text.trim().to_string(),
        amount: norm
            .amount
            .map(|a| a.to_string())
            .unwrap_or_else(|| raw.amount_text.trim().to_string()),
    })
}

fn paired_observation(p: &Pairing) -> String {
    if p.day_offset == 0 {
        format!("similarity {}%", p.score)
    } else {
        format!("similarity {}%, {} day(s) apart", p.score, p.day_offset)
    }
}

fn missing_observation(base: &str, movement: &NormalizedMovement) -> String {
    let mut note = base.to_string();
    for issue in &movement.issues {
        note.push_str("; ");
        note.push_str(&issue.to_string());
    }
    note
}

fn check_conservation(
    rows: &[ReconciliationRow],
    statement_total: usize,
    accounting_total: usize,
) -> Result<(), ReconError> {
    let mut statement_seen = vec![0usize; statement_total];
    let mut accounting_seen = vec![0usize; accounting_total];
    for row in rows {
        if let Some(v) = &row.statement {
            statement_seen[v.index] += 1;
        }
        if let Some(v) = &row.accounting {
            accounting_seen[v.index] += 1;
        }
    }

    for (label, seen) in [("statement", &statement_seen), ("accounting", &accounting_seen)] {
        if let Some(i) = seen.iter().position(|&n| n != 1) {
            return Err(ReconError::UnexpectedProcessing(format!(
                "{label} record {i} appears {} time(s) in the result",
                seen[i]
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_movement;

    fn normalized(raw: &[RawMovement]) -> Vec<NormalizedMovement> {
        raw.iter().enumerate().map(|(i, r)| normalize_movement(i, r)).collect()
    }

    fn pair(
        statement: usize,
        accounting: usize,
        status: MatchStatus,
        day_offset: u32,
        score: u8,
    ) -> Pairing {
        Pairing { statement, accounting, status, day_offset, score }
    }

    #[test]
    fn rows_ordered_and_observed() {
        let s_raw = vec![
            RawMovement::new("05/01/2024", "Retiro cajero", "200"),
            RawMovement::new("06/01/2024", " Compra X ", "-500,00"),
            RawMovement::new("07/01/2024", "Pago luz", "80"),
        ];
        let a_raw = vec![
            RawMovement::new("2024-01-08", "compra x", "500"),
            RawMovement::new("2024-01-07", "Pago luz", "80,00"),
            RawMovement::new("sin fecha", "Ajuste", "1"),
        ];
        let s_norm = normalized(&s_raw);
        let a_norm = normalized(&a_raw);
        let out = MatchOutput {
            pairs: vec![
                pair(2, 1, MatchStatus::Matched, 0, 100),
                pair(1, 0, MatchStatus::Probable, 2, 100),
            ],
            statement_only: vec![0],
            accounting_only: vec![2],
        };

        let result = assemble(
            Side { raw: &s_raw, normalized: &s_norm },
            Side { raw: &a_raw, normalized: &a_norm },
            &out,
        )
        .unwrap();

        let rows = &result.rows;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].statement.as_ref().unwrap().index, 1);
        assert_eq!(rows[0].status, MatchStatus::Probable);
        assert_eq!(rows[0].observation, "similarity 100%, 2 day(s) apart");
        assert_eq!(rows[0].statement.as_ref().unwrap().description, "Compra X");
        assert_eq!(rows[0].statement.as_ref().unwrap().amount, "500.00");
        assert_eq!(rows[0].statement.as_ref().unwrap().date, "2024-01-06");

        assert_eq!(rows[1].status, MatchStatus::Matched);
        assert_eq!(rows[1].observation, "similarity 100%");

        assert_eq!(rows[2].observation, "no counterpart found in accounting records");
        assert!(rows[2].accounting.is_none());

        assert!(rows[3].statement.is_none());
        assert_eq!(
            rows[3].observation,
            "no counterpart found in statement records; unparseable date 'sin fecha'"
        );
        assert_eq!(rows[3].accounting.as_ref().unwrap().date, "sin fecha");

        assert_eq!(
            result.summary,
            ReconSummary {
                statement_total: 3,
                accounting_total: 3,
                matched: 1,
                probable: 1,
                statement_only: 1,
                accounting_only: 1,
            }
        );
    }

    #[test]
    fn cells_follow_fixed_column_order() {
        let s_raw = vec![RawMovement::new("05/01/2024", "Retiro cajero", "200")];
        let a_raw = vec![RawMovement::new("05/01/2024", "Otro", "1")];
        let out = MatchOutput {
            pairs: vec![],
            statement_only: vec![0],
            accounting_only: vec![0],
        };
        let result = assemble(
            Side { raw: &s_raw, normalized: &normalized(&s_raw) },
            Side { raw: &a_raw, normalized: &normalized(&a_raw) },
            &out,
        )
        .unwrap();
        assert_eq!(
            result.rows[0].cells(),
            [
                "2024-01-05".to_string(),
                "Retiro cajero".into(),
                "200.00".into(),
                String::new(),
                String::new(),
                String::new(),
                "unmatched".into(),
                "no counterpart found in accounting records".into(),
            ]
        );
    }

    #[test]
    fn double_use_is_rejected() {
        let s_raw = vec![RawMovement::new("05/01/2024", "A", "1")];
        let a_raw = vec![RawMovement::new("05/01/2024", "A", "1")];
        let out = MatchOutput {
            pairs: vec![pair(0, 0, MatchStatus::Matched, 0, 100)],
            statement_only: vec![0],
            accounting_only: vec![],
        };
        let err = assemble(
            Side { raw: &s_raw, normalized: &normalized(&s_raw) },
            Side { raw: &a_raw, normalized: &normalized(&a_raw) },
            &out,
        )
        .unwrap_err();
        assert!(matches!(err, ReconError::UnexpectedProcessing(_)));
    }

    #[test]
    fn dropped_record_is_rejected() {
        let s_raw = vec![RawMovement::new("05/01/2024", "A", "1")];
        let a_raw = vec![RawMovement::new("05/01/2024", "A", "1")];
        let out = MatchOutput {
            pairs: vec![],
            statement_only: vec![0],
            accounting_only: vec![],
        };
        let err = assemble(
            Side { raw: &s_raw, normalized: &normalized(&s_raw) },
            Side { raw: &a_raw, normalized: &normalized(&a_raw) },
            &out,
        )
        .unwrap_err();
        assert!(err.to_string().contains("accounting record 0 appears 0"));
    }
}
