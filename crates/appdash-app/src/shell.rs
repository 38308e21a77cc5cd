//! Interactive command loop over one session

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use appdash_core::navigation::{NavigationCommand, View};
use appdash_views::pages::{build_page, Page};
use appdash_views::ExportFormat;

use crate::commands::Session;
use crate::render::render_errors;

const HELP: &str = "\
Commands:
  load <path>...          upload files or directories, replacing the dataset
  view <name>             overview | instance_details | filtered_view | data_table
  type <value>            filter by application type
  instance <value>        filter by instance name
  status <value>          filter by application status
  clear                   drop the active filter
  action <n>              run overview quick action n
  search [text]           set or reset the data table search
  select <instance>       pick the instance on the details page
  errors                  list processing errors
  dismiss                 clear processing errors
  history                 list what happened in this session
  show                    render the current page
  export <csv|json> [dir] export the current view
  help                    this text
  quit                    leave the shell";

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    Load(Vec<PathBuf>),
    Navigate(NavigationCommand),
    Action(usize),
    Search(Option<String>),
    Select(String),
    Errors,
    Dismiss,
    History,
    Show,
    Export { format: ExportFormat, dir: PathBuf },
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let value = |what: &str| {
            if rest.is_empty() {
                Err(format!("'{}' needs {}", word, what))
            } else {
                Ok(rest.to_string())
            }
        };

        let command = match word {
            "" => ShellCommand::Empty,
            "load" => {
                let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
                if paths.is_empty() {
                    return Err("'load' needs at least one path".to_string());
                }
                ShellCommand::Load(paths)
            }
            "view" => {
                let view = View::from_key(&value("a view name")?).ok_or_else(|| format!("unknown view '{}'", rest))?;
                ShellCommand::Navigate(NavigationCommand::navigate(view))
            }
            "type" => ShellCommand::Navigate(NavigationCommand::SelectAppType(value("a type")?)),
            "instance" => ShellCommand::Navigate(NavigationCommand::SelectInstance(value("an instance name")?)),
            "status" => ShellCommand::Navigate(NavigationCommand::SelectAppStatus(value("a status")?)),
            "clear" => ShellCommand::Navigate(NavigationCommand::ClearFilter),
            "action" => {
                let n = value("an action number")?
                    .parse::<usize>()
                    .map_err(|_| format!("invalid action number '{}'", rest))?;
                ShellCommand::Action(n)
            }
            "search" => ShellCommand::Search((!rest.is_empty()).then(|| rest.to_string())),
            "select" => ShellCommand::Select(value("an instance name")?),
            "errors" => ShellCommand::Errors,
            "dismiss" => ShellCommand::Dismiss,
            "history" => ShellCommand::History,
            "show" => ShellCommand::Show,
            "export" => {
                let mut parts = rest.split_whitespace();
                let format = parts
                    .next()
                    .ok_or_else(|| "'export' needs a format".to_string())?
                    .parse::<ExportFormat>()?;
                let dir = parts.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
                ShellCommand::Export { format, dir }
            }
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(format!("unknown command '{}', try 'help'", other)),
        };
        Ok(command)
    }
}

/// Whether the loop keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub fn execute(session: &mut Session, command: ShellCommand, out: &mut dyn Write) -> Result<Flow> {
    match command {
        ShellCommand::Empty => {}
        ShellCommand::Load(paths) => {
            session.load(&paths, out)?;
        }
        ShellCommand::Navigate(command) => {
            session.dispatch(command, out)?;
            session.show(out)?;
        }
        ShellCommand::Action(n) => {
            let page = build_page(&session.state, &session.request, &session.config.view);
            let Page::Overview(overview) = page else {
                writeln!(out, "Quick actions are only available on the overview page.")?;
                return Ok(Flow::Continue);
            };
            match n.checked_sub(1).and_then(|idx| overview.quick_actions.get(idx)) {
                Some(action) => {
                    session.dispatch(action.command.clone(), out)?;
                    session.show(out)?;
                }
                None => writeln!(out, "No quick action {}.", n)?,
            }
        }
        ShellCommand::Search(term) => {
            session.request.query.search = term;
            session.show(out)?;
        }
        ShellCommand::Select(instance) => {
            session.request.instance = Some(instance);
            session.show(out)?;
        }
        ShellCommand::Errors => render_errors(out, session.state.errors())?,
        ShellCommand::Dismiss => {
            let cleared = session.state.clear_errors();
            writeln!(out, "Dismissed {} error(s).", cleared)?;
        }
        ShellCommand::History => {
            let history = session.history();
            if history.is_empty() {
                writeln!(out, "Nothing has happened yet.")?;
            }
            for activity in history {
                writeln!(out, "  {}  {}", activity.at.format("%H:%M:%S"), activity.event)?;
            }
        }
        ShellCommand::Show => session.show(out)?,
        ShellCommand::Export { format, dir } => {
            if !session.state.has_data() {
                writeln!(out, "Nothing to export, load data first.")?;
            } else {
                session.export(format, &dir, out)?;
            }
        }
        ShellCommand::Help => writeln!(out, "{}", HELP)?,
        ShellCommand::Quit => return Ok(Flow::Exit),
    }
    Ok(Flow::Continue)
}

/// Read commands until `quit` or end of input
///
/// A bad line or a failing command is reported and the loop goes on.
pub fn run<R: BufRead>(session: &mut Session, input: R, out: &mut dyn Write, prompt: bool) -> Result<()> {
    if prompt {
        write!(out, "appdash> ")?;
        out.flush()?;
    }
    for line in input.lines() {
        let line = line?;
        match line.parse::<ShellCommand>() {
            Ok(command) => match execute(session, command, out) {
                Ok(Flow::Exit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(err) => {
                    tracing::debug!("Shell command failed: {:#}", err);
                    writeln!(out, "Error: {:#}", err)?;
                }
            },
            Err(message) => writeln!(out, "{}", message)?,
        }
        if prompt {
            write!(out, "appdash> ")?;
            out.flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;

    #[test]
    fn test_parse_commands() {
        assert_eq!("".parse::<ShellCommand>(), Ok(ShellCommand::Empty));
        assert_eq!(
            "type  docker ".parse::<ShellCommand>(),
            Ok(ShellCommand::Navigate(NavigationCommand::SelectAppType("docker".into())))
        );
        assert_eq!(
            "instance web server 01".parse::<ShellCommand>(),
            Ok(ShellCommand::Navigate(NavigationCommand::SelectInstance("web server 01".into())))
        );
        assert_eq!(
            "view data_table".parse::<ShellCommand>(),
            Ok(ShellCommand::Navigate(NavigationCommand::navigate(View::DataTable)))
        );
        assert_eq!(
            "load a.json dir".parse::<ShellCommand>(),
            Ok(ShellCommand::Load(vec![PathBuf::from("a.json"), PathBuf::from("dir")]))
        );
        assert_eq!(
            "export json out".parse::<ShellCommand>(),
            Ok(ShellCommand::Export { format: ExportFormat::Json, dir: PathBuf::from("out") })
        );
        assert_eq!("search".parse::<ShellCommand>(), Ok(ShellCommand::Search(None)));
        assert_eq!("action 2".parse::<ShellCommand>(), Ok(ShellCommand::Action(2)));
        assert_eq!("exit".parse::<ShellCommand>(), Ok(ShellCommand::Quit));
        assert_eq!("history".parse::<ShellCommand>(), Ok(ShellCommand::History));
    }

    #[test]
    fn test_parse_errors() {
        assert!("type".parse::<ShellCommand>().is_err());
        assert!("view nowhere".parse::<ShellCommand>().is_err());
        assert!("export xml".parse::<ShellCommand>().is_err());
        assert!("action two".parse::<ShellCommand>().is_err());
        assert!("frobnicate".parse::<ShellCommand>().is_err());
    }

    #[test]
    fn test_session_script() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("a.json"),
            r#"{"instance_id": "i-1", "instance_name": "host-a", "applications": [
                {"name": "nginx", "type": "docker"}, {"name": "cron", "type": "service"}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("b.json"), "").unwrap();

        let script = format!(
            "load {dir}\nerrors\nstatus running\nclear\nview overview\naction 3\nexport csv {dir}\ndismiss\nhistory\nquit\nshow\n",
            dir = dir.path().display()
        );
        let mut session = Session::new(DashboardConfig::default());
        let mut out = Vec::new();
        run(&mut session, script.as_bytes(), &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Loaded 2 applications from 1 of 2 file(s)"));
        assert!(text.contains("Error processing b.json: File is empty"));
        assert!(text.contains("Warning: No status information available to filter on 'running'"));
        assert!(text.contains("Filtered by type: docker"));
        assert!(dir.path().join("filtered_applications_docker.csv").exists());
        assert!(text.contains("Dismissed 1 error(s)."));
        assert!(session.state.errors().is_empty());
        assert!(text.contains("loaded 2 application(s), 1 file error(s)"));
        assert!(text.contains("Filtered View (type = docker)"));
        assert!(text.contains("cleared 1 error(s)"));
        // nothing after quit runs
        assert_eq!(text.matches("== Filtered View ==").count(), 3);
    }

    #[test]
    fn test_bad_lines_do_not_stop_the_loop() {
        let mut session = Session::new(DashboardConfig::default());
        let mut out = Vec::new();
        run(&mut session, "bogus\nload /definitely/missing.json\nhelp\n".as_bytes(), &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("unknown command 'bogus'"));
        assert!(text.contains("Error processing missing.json: Could not read file"));
        assert!(text.contains("Error: No valid data found in 1 uploaded file(s)"));
        assert!(text.contains("Commands:"));
    }
}
