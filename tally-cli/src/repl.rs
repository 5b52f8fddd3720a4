//! Interactive command loop driving a [`ClassificationSession`].
//!
//! A failing command prints the error and the help text; the loop always
//! continues until `quit` or end of input.

use anyhow::{anyhow, bail, Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use tally_finance::ClassificationSession;

pub const HELP: &str = "\
h, help                       Display this help message
o, overview                   Display an overview of the expenses / incomes per category
p, save-predictions <file>    Write corpus with predicted categories appended to <file>
t, save-training <file>       Write training set to <file>
l, list <category>            List entries in category
c, categorize <id> <category> Classify item <id> into <category>
d, debug                      Dump features and training set as JSON
q, quit                       Quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Overview,
    SavePredictions(PathBuf),
    SaveTraining(PathBuf),
    List(String),
    Categorize { item_id: usize, category: String },
    Debug,
    Quit,
}

/// Parse one input line. Blank lines parse to `None`.
///
/// Trailing words of a category are joined with single spaces, so
/// `c 4 eating out` assigns item 4 to `eating out`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let cmd = match name {
        "h" | "help" => Command::Help,
        "o" | "overview" => Command::Overview,
        "d" | "debug" => Command::Debug,
        "q" | "quit" => Command::Quit,
        "p" | "save-predictions" => Command::SavePredictions(path_arg(&rest)?),
        "t" | "save-training" => Command::SaveTraining(path_arg(&rest)?),
        "l" | "list" => Command::List(category_arg(&rest)?),
        "c" | "categorize" => {
            let (id, category) = rest
                .split_first()
                .ok_or_else(|| anyhow!("missing item id"))?;
            let item_id = id
                .parse::<usize>()
                .with_context(|| format!("invalid item id '{id}'"))?;
            Command::Categorize {
                item_id,
                category: category_arg(category)?,
            }
        }
        other => bail!("unknown command: {other}"),
    };
    Ok(Some(cmd))
}

fn path_arg(rest: &[&str]) -> Result<PathBuf> {
    match rest {
        [path] => Ok(PathBuf::from(path)),
        [] => bail!("missing file name"),
        _ => bail!("expected a single file name"),
    }
}

fn category_arg(rest: &[&str]) -> Result<String> {
    if rest.is_empty() {
        bail!("missing category");
    }
    Ok(rest.join(" "))
}

pub fn execute<W: Write>(session: &mut ClassificationSession, cmd: &Command, out: &mut W) -> Result<()> {
    match cmd {
        Command::Help => {
            writeln!(out, "*** Help")?;
            writeln!(out, "{HELP}")?;
        }
        Command::Overview => {
            writeln!(out, "*** Overview")?;
            // Totals are money: always two decimals
            for row in session.overview() {
                writeln!(
                    out,
                    "{:<10.2} {:<4} {}",
                    row.total_amount, row.item_count, row.category
                )?;
            }
        }
        Command::SavePredictions(path) => {
            writeln!(out, "*** Writing predictions to '{}'", path.display())?;
            tally_ingest::save_predictions(path, session.labeled_corpus())
                .with_context(|| format!("saving predictions to {}", path.display()))?;
        }
        Command::SaveTraining(path) => {
            writeln!(out, "*** Saving training file to '{}'", path.display())?;
            tally_ingest::save_training(path, session.training_set())
                .with_context(|| format!("saving training set to {}", path.display()))?;
        }
        Command::List(category) => {
            writeln!(out, "*** Listing items in category '{category}'")?;
            for (id, txn) in session.list_category(category)? {
                writeln!(out, "{:<5} {}", id, txn.to_line())?;
            }
        }
        Command::Categorize { item_id, category } => {
            writeln!(out, "*** Classifying '{item_id}' into '{category}'")?;
            session.categorize(*item_id, category)?;
        }
        Command::Debug => {
            writeln!(out, "*** Debugging")?;
            let json = serde_json::to_string_pretty(&session.debug_snapshot())
                .context("serialize debug snapshot")?;
            writeln!(out, "{json}")?;
        }
        Command::Quit => {}
    }
    Ok(())
}

/// Show the overview, then read and run commands until `quit` or EOF.
pub fn run<R: BufRead, W: Write>(session: &mut ClassificationSession, input: R, out: &mut W) -> Result<()> {
    execute(session, &Command::Overview, out)?;
    prompt(out)?;

    for line in input.lines() {
        let line = line.context("read command")?;
        let result = match parse_command(&line) {
            Ok(Some(Command::Quit)) => return Ok(()),
            Ok(Some(cmd)) => execute(session, &cmd, out),
            Ok(None) => Ok(()),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::debug!(command = line.trim(), error = %e, "command failed");
            writeln!(out, "*** Error while processing command '{}'", line.trim())?;
            writeln!(out, "{e:#}")?;
            writeln!(out, "{HELP}")?;
        }
        prompt(out)?;
    }

    writeln!(out)?;
    Ok(())
}

fn prompt<W: Write>(out: &mut W) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tally_finance::SessionSettings;
    use tally_ingest::{LabeledTransaction, Transaction};

    fn session() -> ClassificationSession {
        let txn = |l: &str| Transaction::parse_line(l).unwrap();
        let training = vec![
            LabeledTransaction::new(txn("2023/01/01;X;Y;SHOP A;12.50"), "food"),
            LabeledTransaction::new(txn("2023/01/02;X;Y;GAS STATION;40.00"), "transport"),
        ];
        let corpus = vec![
            txn("2023/01/03;X;Y;SHOP A EXTRA;15.00"),
            txn("2023/01/04;X;Y;GAS STATION;35.00"),
        ];
        ClassificationSession::new(training, corpus, &SessionSettings::default()).unwrap()
    }

    fn run_script(session: &mut ClassificationSession, script: &str) -> String {
        let mut out = Vec::new();
        run(session, Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("o").unwrap(), Some(Command::Overview));
        assert_eq!(parse_command("overview").unwrap(), Some(Command::Overview));
        assert_eq!(
            parse_command("list eating out").unwrap(),
            Some(Command::List("eating out".to_string()))
        );
        assert_eq!(
            parse_command("c 12 food").unwrap(),
            Some(Command::Categorize { item_id: 12, category: "food".to_string() })
        );
        assert_eq!(
            parse_command("save-training out.csv").unwrap(),
            Some(Command::SaveTraining(PathBuf::from("out.csv")))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("x").is_err());
        assert!(parse_command("c").is_err());
        assert!(parse_command("c abc food").is_err());
        assert!(parse_command("c 3").is_err());
        assert!(parse_command("l").is_err());
        assert!(parse_command("p").is_err());
        assert!(parse_command("p a b").is_err());
    }

    #[test]
    fn test_startup_overview_and_quit() {
        let mut s = session();
        let out = run_script(&mut s, "q\nh\n");
        assert!(out.starts_with("*** Overview\n"));
        assert!(out.contains("15.00      1    food\n"), "{out}");
        assert!(out.contains("35.00      1    transport\n"), "{out}");
        // nothing after quit is executed
        assert!(!out.contains("*** Help"));
    }

    #[test]
    fn test_overview_prints_cents() {
        let txn = |l: &str| Transaction::parse_line(l).unwrap();
        let training = vec![LabeledTransaction::new(txn("2023/01/01;X;Y;SNCF;-18.20"), "transport")];
        let corpus = vec![txn("2023/01/05;X;Y;SNCF;-18.2")];
        let mut s = ClassificationSession::new(training, corpus, &SessionSettings::default()).unwrap();
        let out = run_script(&mut s, "");
        assert!(out.contains("-18.20     1    transport\n"), "{out}");
    }

    #[test]
    fn test_category_with_separator_is_refused() {
        let mut s = session();
        let out = run_script(&mut s, "c 0 eat;out\n");
        assert!(out.contains("*** Error while processing command 'c 0 eat;out'"), "{out}");
        assert!(out.contains("invalid category 'eat;out'"), "{out}");
        assert_eq!(s.training_set().len(), 2);
    }

    #[test]
    fn test_bad_command_does_not_end_session() {
        let mut s = session();
        let out = run_script(&mut s, "bogus\nc 99 food\nl nothing\no\n");
        assert_eq!(out.matches("*** Error while processing command").count(), 3);
        assert!(out.contains("unknown command: bogus"));
        assert!(out.contains("out of range"));
        assert!(out.contains("unknown category 'nothing'"));
        assert_eq!(out.matches("*** Overview").count(), 2);
    }

    #[test]
    fn test_categorize_and_list() {
        let mut s = session();
        let out = run_script(&mut s, "c 0 transport\nl transport\n");
        assert!(out.contains("*** Classifying '0' into 'transport'"));
        assert_eq!(s.training_set().len(), 3);
        assert!(out.contains("0     2023/01/03;X;Y;SHOP A EXTRA;15.00\n"), "{out}");
    }

    #[test]
    fn test_save_commands_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let preds = dir.path().join("pred.csv");
        let train = dir.path().join("train.csv");
        let mut s = session();
        let script = format!("p {}\nt {}\n", preds.display(), train.display());
        run_script(&mut s, &script);

        let written = std::fs::read_to_string(&preds).unwrap();
        assert_eq!(
            written,
            "2023/01/03;X;Y;SHOP A EXTRA;15.00;food\n2023/01/04;X;Y;GAS STATION;35.00;transport\n"
        );
        let written = std::fs::read_to_string(&train).unwrap();
        assert_eq!(written.lines().count(), 2);
        assert!(written.ends_with("GAS STATION;40.00;transport\n"));
    }

    #[test]
    fn test_debug_dumps_json() {
        let mut s = session();
        let out = run_script(&mut s, "d\n");
        assert!(out.contains("\"feature_names\""));
        assert!(out.contains("\"gas station\""));
    }
}
