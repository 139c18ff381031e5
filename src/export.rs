//! CSV, JSON, and text dumps of a decision process.
//!
//! These consume the state table read-only and exist for persistence and
//! debugging. The CSV layout is one row per (state, action, outcome, target)
//! tuple in nested order, with the columns
//! `idstatefrom,idaction,idoutcome,idstateto,probability,reward`.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;

use crate::{
    error::{Error, Result},
    process::StateTable,
    state::State,
};

/// Header line of the CSV dump.
pub const CSV_HEADER: &str = "idstatefrom,idaction,idoutcome,idstateto,probability,reward";

/// Write the process as CSV rows.
///
/// Rows are newline-terminated and ordered by state, then action, then
/// outcome, then target. States without actions produce no rows, so an
/// imported model may differ from the exported one in trailing terminal
/// states.
pub fn to_csv<S: State, W: Write>(
    table: &StateTable<S>,
    writer: &mut W,
    header: bool,
) -> Result<()> {
    if header {
        writeln!(writer, "{CSV_HEADER}")?;
    }

    for (state_id, state) in table.iter() {
        for action_id in 0..state.action_count() {
            for (outcome_id, outcome) in state.outcomes(action_id).iter().enumerate() {
                for (target, probability, reward) in outcome.entries() {
                    writeln!(
                        writer,
                        "{state_id},{action_id},{outcome_id},{target},{probability},{reward}"
                    )?;
                }
            }
        }
    }
    Ok(())
}

/// Write the CSV dump to a file.
pub fn to_csv_file<S: State>(
    table: &StateTable<S>,
    path: impl AsRef<Path>,
    header: bool,
) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::Io {
        operation: format!("create {}", path.display()),
        source,
    })?;

    let mut writer = BufWriter::new(file);
    to_csv(table, &mut writer, header)?;
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct JsonDump<'a, S> {
    states: &'a [S],
}

/// Render the process as JSON: `{"states": [...]}` in ascending id order,
/// each element produced by the state's own serializer. The position in the
/// array implies the state id.
pub fn to_json<S: State>(table: &StateTable<S>) -> Result<String> {
    let dump = JsonDump {
        states: table.states(),
    };
    Ok(serde_json::to_string(&dump)?)
}

/// Render a brief nested human-readable listing of the process.
///
/// Mostly suitable for analyzing small models.
pub fn to_text<S: State>(table: &StateTable<S>) -> String {
    let mut result = String::new();
    for (state_id, state) in table.iter() {
        result.push_str(&format!("{state_id} : {}\n", state.action_count()));
        for action_id in 0..state.action_count() {
            result.push_str(&format!("    {action_id} :"));
            for outcome in state.outcomes(action_id) {
                result.push_str(" {");
                for (position, (target, probability, reward)) in
                    outcome.entries().enumerate()
                {
                    if position > 0 {
                        result.push_str(", ");
                    }
                    result.push_str(&format!("{target}:{probability}:{reward}"));
                }
                result.push('}');
            }
            result.push('\n');
        }
    }
    result
}
