use crate::case::{EvidenceFilter, Side};
use crate::error::CommandError;
use crate::persona::RoleKind;
use strum::IntoEnumIterator;

/// A line typed in the courtroom input that starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Address(RoleKind),
    Call(String),
    Note(String),
    Unnote(usize),
    Template(String),
    Filter(EvidenceFilter),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHelp {
    pub usage: String,
    pub description: String,
}

impl SlashCommand {
    /// `None` for plain speech, otherwise the parsed command.
    pub fn parse(input: &str) -> Option<Result<Self, CommandError>> {
        let rest = input.trim().strip_prefix('/')?;
        let (name, argument) = match rest.split_once(char::is_whitespace) {
            Some((name, argument)) => (name, argument.trim()),
            None => (rest, ""),
        };
        Some(Self::parse_named(&name.to_lowercase(), argument))
    }

    fn parse_named(name: &str, argument: &str) -> Result<Self, CommandError> {
        match name {
            "call" => required(argument, "call").map(|id| SlashCommand::Call(id.to_lowercase())),
            "note" => required(argument, "note").map(|text| SlashCommand::Note(text.to_string())),
            "unnote" => {
                let index = required(argument, "unnote")?;
                match index.parse::<usize>() {
                    Ok(n) if n > 0 => Ok(SlashCommand::Unnote(n)),
                    _ => Err(CommandError::InvalidNoteIndex(index.to_string())),
                }
            }
            "template" => {
                required(argument, "template").map(|id| SlashCommand::Template(id.to_string()))
            }
            "filter" => {
                let kind = required(argument, "filter")?;
                kind.parse()
                    .map(SlashCommand::Filter)
                    .map_err(|_| CommandError::UnknownFilter(kind.to_string()))
            }
            "to" => RoleKind::parse(required(argument, "to")?).map(SlashCommand::Address),
            "help" | "?" => Ok(SlashCommand::Help),
            "quit" | "exit" => Ok(SlashCommand::Quit),
            other => RoleKind::parse(other)
                .map(SlashCommand::Address)
                .map_err(|_| CommandError::UnknownCommand(other.to_string())),
        }
    }

    /// Persona commands first, then the shell commands.
    pub fn catalog(side: Side) -> Vec<CommandHelp> {
        let mut catalog: Vec<CommandHelp> = RoleKind::iter()
            .map(|role| CommandHelp {
                usage: format!("/{role}"),
                description: describe(role, side).to_string(),
            })
            .collect();

        let shell = [
            ("/to <role>", "Address a persona by name"),
            ("/call <witness>", "Call a witness to the stand"),
            ("/note <text>", "Pin a note"),
            ("/unnote <n>", "Remove note number n"),
            ("/template <id>", "Load a tactical template into the input"),
            ("/filter <kind>", "Show all, document, image or pdf evidence"),
            ("/help", "List commands"),
            ("/quit", "Leave the courtroom"),
        ];
        catalog.extend(shell.into_iter().map(|(usage, description)| CommandHelp {
            usage: usage.to_string(),
            description: description.to_string(),
        }));
        catalog
    }
}

fn required<'a>(argument: &'a str, command: &'static str) -> Result<&'a str, CommandError> {
    if argument.is_empty() {
        Err(CommandError::MissingArgument(command))
    } else {
        Ok(argument)
    }
}

fn describe(role: RoleKind, side: Side) -> &'static str {
    match (role, side) {
        (RoleKind::Judge, _) => "Address the Court",
        (RoleKind::Mentor, Side::Defense) => "Consult Co-Counsel",
        (RoleKind::Mentor, Side::Prosecution) => "Consult D.A.",
        (RoleKind::Opposing, Side::Defense) => "Address Prosecutor",
        (RoleKind::Opposing, Side::Prosecution) => "Address Defense",
        (RoleKind::Clerk, _) => "Ask the Clerk",
        (RoleKind::Jury, _) => "Gauge the Jury",
        (RoleKind::Witness, _) => "Question the witness on the stand",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_speech_is_not_a_command() {
        assert_eq!(SlashCommand::parse("Your Honor, I object."), None);
        assert_eq!(SlashCommand::parse(""), None);
    }

    #[test]
    fn role_commands() {
        assert_eq!(
            SlashCommand::parse("/judge"),
            Some(Ok(SlashCommand::Address(RoleKind::Judge)))
        );
        assert_eq!(
            SlashCommand::parse("  /Mentor "),
            Some(Ok(SlashCommand::Address(RoleKind::Mentor)))
        );
        assert_eq!(
            SlashCommand::parse("/to jury"),
            Some(Ok(SlashCommand::Address(RoleKind::Jury)))
        );
        assert_eq!(
            SlashCommand::parse("/to bailiff"),
            Some(Err(CommandError::UnknownRole("bailiff".to_string())))
        );
    }

    #[test]
    fn shell_commands_take_arguments() {
        assert_eq!(
            SlashCommand::parse("/call Miller"),
            Some(Ok(SlashCommand::Call("miller".to_string())))
        );
        assert_eq!(
            SlashCommand::parse("/note  Ask about the timestamp gap "),
            Some(Ok(SlashCommand::Note("Ask about the timestamp gap".to_string())))
        );
        assert_eq!(SlashCommand::parse("/unnote 2"), Some(Ok(SlashCommand::Unnote(2))));
        assert_eq!(SlashCommand::parse("/quit"), Some(Ok(SlashCommand::Quit)));
        assert_eq!(
            SlashCommand::parse("/filter Image"),
            Some(Ok(SlashCommand::Filter(EvidenceFilter::Image)))
        );
    }

    #[test]
    fn malformed_commands_are_reported() {
        assert_eq!(
            SlashCommand::parse("/call"),
            Some(Err(CommandError::MissingArgument("call")))
        );
        assert_eq!(
            SlashCommand::parse("/unnote 0"),
            Some(Err(CommandError::InvalidNoteIndex("0".to_string())))
        );
        assert_eq!(
            SlashCommand::parse("/filter video"),
            Some(Err(CommandError::UnknownFilter("video".to_string())))
        );
        assert_eq!(
            SlashCommand::parse("/dance"),
            Some(Err(CommandError::UnknownCommand("dance".to_string())))
        );
    }

    #[test]
    fn catalog_depends_on_side() {
        let defense = SlashCommand::catalog(Side::Defense);
        let prosecution = SlashCommand::catalog(Side::Prosecution);
        let mentor = |catalog: &[CommandHelp]| {
            catalog
                .iter()
                .find(|entry| entry.usage == "/mentor")
                .map(|entry| entry.description.clone())
        };
        assert_eq!(mentor(&defense).as_deref(), Some("Consult Co-Counsel"));
        assert_eq!(mentor(&prosecution).as_deref(), Some("Consult D.A."));
        assert!(defense.iter().any(|entry| entry.description == "Address Prosecutor"));
        assert!(prosecution.iter().any(|entry| entry.description == "Address Defense"));
        assert_eq!(defense.len(), prosecution.len());
    }
}
