pub mod assistant;
pub mod audio;
pub mod controller;
pub mod encoder;
pub mod processing;
pub mod settings;
pub mod streaming;
pub mod transcript;

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};

use assistant::{refine_timed, summarize_timed, AssistantError, HttpAssistant};
use audio::MicCaptureSource;
use controller::{RecordingController, Status};
use processing::{convert_to_markdown, ExportArtifact, UserInputError};
use streaming::{ChannelNotice, TranscribeEndpoint, TranscriptionChannel};
use transcript::TranscriptState;

fn status_label(status: Status) -> &'static str {
    match status {
        Status::Idle => "idle",
        Status::Recording => "recording",
        Status::Paused => "paused",
    }
}

fn print_help() {
    println!("Commands:");
    println!("  start | pause | resume | stop    control recording");
    println!("  show                             current status and transcript");
    println!("  notes <path>                     load notes from a text file");
    println!("  md                               convert loaded notes to Markdown");
    println!("  finalize                         summarize transcript and notes");
    println!("  feedback <text>                  refine the last summary");
    println!("  export <transcript|notes|summary>");
    println!("  reset                            discard everything and start over");
    println!("  quit");
}

/// Run the interactive client: wire the controller to the microphone and
/// the transcription channel, then drive it from stdin commands.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = settings::load_settings();
    let endpoint = TranscribeEndpoint::from_origin(&settings.server_origin)?;
    log::info!("Transcription endpoint: {}", endpoint);

    let (notice_tx, mut notice_rx) = mpsc::channel::<ChannelNotice>(32);
    let observed = Arc::new(Mutex::new(TranscriptState::new()));

    // Channel notices arrive independently of the audio callback; this task
    // is the single consumer that folds them into the observed transcript.
    let observed_for_notices = Arc::clone(&observed);
    tokio::spawn(async move {
        while let Some(notice) = notice_rx.recv().await {
            match notice {
                ChannelNotice::Opened => {
                    log::info!("Connected to backend for transcription");
                }
                ChannelNotice::Transcript { text } => {
                    observed_for_notices.lock().await.replace(&text);
                }
                ChannelNotice::Error(e) => {
                    eprintln!("Connection error: {}", e);
                }
                ChannelNotice::Closed => {
                    log::info!("Disconnected from backend");
                }
            }
        }
    });

    let channel_endpoint = endpoint.clone();
    let mut controller = RecordingController::new(MicCaptureSource::new(), move || {
        TranscriptionChannel::open(channel_endpoint.clone(), notice_tx.clone())
    });

    let http_assistant = settings.assistant_endpoint.clone().map(HttpAssistant::new);
    let export_dir = settings
        .export_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));

    let mut notes: Option<String> = None;
    let mut notes_markdown: Option<String> = None;
    let mut last_reply: Option<String> = None;

    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        match command {
            "" => {}

            "start" => match controller.start() {
                Ok(()) => println!("Recording."),
                Err(e) => eprintln!("Unable to start recording: {}", e),
            },
            "pause" => {
                controller.pause();
                println!("Status: {}", status_label(controller.status()));
            }
            "resume" => {
                controller.resume();
                println!("Status: {}", status_label(controller.status()));
            }
            "stop" => {
                controller.stop();
                println!("Stopped.");
            }

            "show" => {
                println!("Status: {}", status_label(controller.status()));
                if let Some(started_at) = controller.started_at() {
                    println!("Started: {}", started_at.to_rfc3339());
                }
                let observed = observed.lock().await;
                if observed.has_text() {
                    println!("Transcript: {}", observed.current_text());
                } else {
                    println!("Transcript: (empty)");
                }
            }

            "notes" => {
                if rest.is_empty() {
                    eprintln!("Usage: notes <path>");
                    continue;
                }
                match tokio::fs::read_to_string(rest).await {
                    Ok(content) => {
                        println!("Notes loaded: {} ({} bytes)", rest, content.len());
                        notes = Some(content);
                    }
                    Err(e) => eprintln!("Failed to read {}: {}", rest, e),
                }
            }

            "md" => match convert_to_markdown(notes.as_deref().unwrap_or("")) {
                Ok(md) => {
                    println!("{}", md);
                    notes_markdown = Some(md);
                }
                Err(e) => eprintln!("{}", e),
            },

            "finalize" => {
                let transcript_text = observed.lock().await.current_text().to_string();
                match finalize(
                    http_assistant.as_ref(),
                    &transcript_text,
                    notes_markdown.as_deref(),
                )
                .await
                {
                    Ok(reply) => {
                        println!("{}", reply.text);
                        println!("(completed in {:.1}s)", reply.elapsed.as_secs_f64());
                        last_reply = Some(reply.text);
                    }
                    Err(e) => eprintln!("{}", e),
                }
            }

            "feedback" => {
                match apply_feedback(http_assistant.as_ref(), last_reply.as_deref(), rest).await {
                    Ok(reply) => {
                        println!("{}", reply.text);
                        println!("(completed in {:.1}s)", reply.elapsed.as_secs_f64());
                        last_reply = Some(reply.text);
                    }
                    Err(e) => eprintln!("{}", e),
                }
            }

            "export" => {
                let artifact = match rest {
                    "transcript" => {
                        let observed = observed.lock().await;
                        if !observed.has_text() {
                            eprintln!("{}", UserInputError::NothingToExport);
                            continue;
                        }
                        ExportArtifact::transcript(observed.current_text())
                    }
                    "notes" => match notes_markdown.as_deref() {
                        Some(md) => ExportArtifact::notes_markdown(md),
                        None => {
                            eprintln!("{}", UserInputError::NothingToExport);
                            continue;
                        }
                    },
                    "summary" => match last_reply.as_deref() {
                        Some(reply) => ExportArtifact::summary(reply),
                        None => {
                            eprintln!("{}", UserInputError::NothingToExport);
                            continue;
                        }
                    },
                    _ => {
                        eprintln!("Usage: export <transcript|notes|summary>");
                        continue;
                    }
                };
                match artifact.write_to(&export_dir) {
                    Ok(path) => println!("Exported: {}", path.display()),
                    Err(e) => eprintln!("Export failed: {}", e),
                }
            }

            "reset" => {
                controller.reset();
                observed.lock().await.clear();
                notes = None;
                notes_markdown = None;
                last_reply = None;
                println!("Reset. Ready to start fresh.");
            }

            "help" => print_help(),
            "quit" | "exit" => break,

            other => eprintln!("Unknown command: {} (try 'help')", other),
        }
    }

    controller.stop();
    Ok(())
}

/// Errors a finalize/feedback command can surface to the user.
#[derive(Debug)]
enum CommandError {
    Input(UserInputError),
    Assistant(AssistantError),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Input(e) => write!(f, "{}", e),
            CommandError::Assistant(e) => write!(f, "{}", e),
        }
    }
}

async fn finalize(
    assistant: Option<&HttpAssistant>,
    transcript: &str,
    notes_markdown: Option<&str>,
) -> Result<assistant::AssistantReply, CommandError> {
    let notes = notes_markdown.unwrap_or("");
    if transcript.is_empty() && notes.is_empty() {
        return Err(CommandError::Input(UserInputError::NothingToFinalize));
    }
    let assistant = assistant.ok_or(CommandError::Assistant(AssistantError::MissingEndpoint))?;

    summarize_timed(assistant, transcript, notes)
        .await
        .map_err(CommandError::Assistant)
}

async fn apply_feedback(
    assistant: Option<&HttpAssistant>,
    last_reply: Option<&str>,
    feedback: &str,
) -> Result<assistant::AssistantReply, CommandError> {
    if feedback.is_empty() {
        return Err(CommandError::Input(UserInputError::EmptyFeedback));
    }
    let previous = last_reply.ok_or(CommandError::Input(UserInputError::NoPriorReply))?;
    let assistant = assistant.ok_or(CommandError::Assistant(AssistantError::MissingEndpoint))?;

    refine_timed(assistant, previous, feedback)
        .await
        .map_err(CommandError::Assistant)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_finalize_with_nothing_is_a_user_input_error() {
        let result = finalize(None, "", None).await;
        assert!(matches!(
            result,
            Err(CommandError::Input(UserInputError::NothingToFinalize))
        ));
    }

    #[tokio::test]
    async fn test_finalize_without_assistant_reports_missing_endpoint() {
        let result = finalize(None, "some transcript", None).await;
        assert!(matches!(
            result,
            Err(CommandError::Assistant(AssistantError::MissingEndpoint))
        ));
    }

    #[tokio::test]
    async fn test_feedback_guards_order() {
        // Empty feedback is rejected before the missing-reply check.
        let result = apply_feedback(None, None, "").await;
        assert!(matches!(
            result,
            Err(CommandError::Input(UserInputError::EmptyFeedback))
        ));

        let result = apply_feedback(None, None, "make it shorter").await;
        assert!(matches!(
            result,
            Err(CommandError::Input(UserInputError::NoPriorReply))
        ));
    }
}
