mod challenge;
mod corpus;
mod engine;
mod error;
mod generator;
mod orchestrator;
mod remote;
mod session;
mod store;

use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::Result;
use clap::{Parser, Subcommand};

use challenge::{ChallengeSet, Difficulty, GameVariant};
use orchestrator::ContentRequest;
use remote::RemoteContent;
use session::duel::{self, DuelAttempt, DuelWinner};
use session::prompt;
use session::SessionController;
use store::Storage;
use store::kv::JsonFileStore;

#[derive(Parser)]
#[command(name = "spellbound", version, about = "Spelling practice with adaptive word selection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play one round of a game variant
    Play {
        #[arg(short, long, default_value = "classic")]
        variant: GameVariant,

        #[arg(short, long, default_value = "medium")]
        difficulty: Difficulty,
    },
    /// Show today's daily challenge word
    Daily {
        #[arg(short, long, default_value = "medium")]
        difficulty: Difficulty,
    },
    /// List your least-mastered words
    Stats {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Start or reset the adventure campaign
    Campaign {
        #[arg(short, long)]
        theme: Option<String>,

        #[arg(long)]
        reset: bool,
    },
    /// Show the current mode, or go back online after an automatic switch
    Settings {
        /// Turn offline mode off and try remote content again
        #[arg(long)]
        online: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(JsonFileStore::new()?);
    let mut controller = SessionController::new(storage);

    match cli.command {
        Command::Play { variant, difficulty } => {
            let variant = if variant == GameVariant::Wheel {
                let spun = controller.spin_wheel();
                println!("The wheel lands on: {spun}");
                spun
            } else {
                variant
            };
            let request = ContentRequest::Fresh {
                variant,
                difficulty,
                theme: controller.campaign().map(|c| c.theme),
            };
            play_round(&mut controller, &request)?;
        }
        Command::Daily { difficulty } => {
            let request = ContentRequest::Fresh {
                variant: GameVariant::Daily,
                difficulty,
                theme: None,
            };
            play_round(&mut controller, &request)?;
        }
        Command::Stats { limit } => {
            let weak = controller.mastery().weak_words(limit);
            if weak.is_empty() {
                println!("No words tracked yet. Play a round first.");
            } else {
                println!("Words to practice (weakest first):");
                for word in weak {
                    let score = controller.mastery().score(&word).unwrap_or(0.0);
                    println!("  {word:<20} {:>3.0}%", score * 100.0);
                }
            }
        }
        Command::Campaign { theme, reset } => {
            if reset {
                controller.reset_campaign();
                println!("Campaign cleared.");
            } else if let Some(theme) = theme {
                let campaign = controller.start_campaign(&theme);
                println!("New {theme} journey:");
                for level in &campaign.levels {
                    println!("  {} ({})", level.name, level.difficulty);
                }
            } else if let Some(campaign) = controller.campaign() {
                println!("{} journey:", campaign.theme);
                for level in &campaign.levels {
                    let mark = if level.is_completed {
                        "done"
                    } else if level.is_unlocked {
                        "open"
                    } else {
                        "locked"
                    };
                    println!("  [{mark}] {} ({})", level.name, level.difficulty);
                }
            } else {
                println!("No campaign yet. Start one with --theme.");
            }
        }
        Command::Settings { online } => {
            if online {
                controller.set_offline_mode(false)?;
                println!("Back online. Remote content will be tried on the next round.");
            } else if controller.offline_mode() {
                println!("Mode: offline. Go back online with `settings --online`.");
            } else {
                println!("Mode: online.");
            }
        }
    }

    Ok(())
}

fn remote_from_env() -> Option<impl RemoteContent> {
    #[cfg(feature = "network")]
    {
        let url = std::env::var("SPELLBOUND_REMOTE_URL").ok()?;
        remote::HttpRemote::new(&url).ok()
    }
    #[cfg(not(feature = "network"))]
    {
        None::<NoRemote>
    }
}

#[cfg(not(feature = "network"))]
struct NoRemote;

#[cfg(not(feature = "network"))]
impl RemoteContent for NoRemote {
    fn word_list(
        &self,
        _difficulty: Difficulty,
        _count: usize,
        _category: Option<&str>,
    ) -> Result<Vec<challenge::WordChallenge>, error::ContentError> {
        Err(error::ContentError::RemoteUnavailable("built without network".into()))
    }

    fn homophones(
        &self,
        _difficulty: Difficulty,
        _count: usize,
    ) -> Result<Vec<challenge::HomophoneChallenge>, error::ContentError> {
        Err(error::ContentError::RemoteUnavailable("built without network".into()))
    }

    fn remedial_word_list(
        &self,
        _missed_words: &[String],
        _count: usize,
    ) -> Result<Vec<challenge::WordChallenge>, error::ContentError> {
        Err(error::ContentError::RemoteUnavailable("built without network".into()))
    }

    fn remedial_homophones(
        &self,
        _missed_words: &[String],
        _count: usize,
    ) -> Result<Vec<challenge::HomophoneChallenge>, error::ContentError> {
        Err(error::ContentError::RemoteUnavailable("built without network".into()))
    }

    fn daily_word(
        &self,
        _difficulty: Difficulty,
    ) -> Result<challenge::WordChallenge, error::ContentError> {
        Err(error::ContentError::RemoteUnavailable("built without network".into()))
    }
}

fn play_round(
    controller: &mut SessionController<JsonFileStore>,
    request: &ContentRequest,
) -> Result<()> {
    let remote = remote_from_env();
    let outcome = match controller.start_round(remote.as_ref(), request) {
        Ok(outcome) => outcome,
        Err(e) => {
            // Both paths exhausted: abort to a safe state, never crash
            eprintln!("Could not load a round: {e}");
            return Ok(());
        }
    };
    if outcome.switched_offline {
        println!("(Remote unavailable. Switched to offline mode.)");
    }

    if request.variant() == GameVariant::Multiplayer {
        run_duel(controller)?;
        return Ok(());
    }
    run_challenges(controller)?;

    if let Some(remedial) = controller.remedial_request() {
        print!("Practice your mistakes? [y/N] ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        if line.trim().eq_ignore_ascii_case("y") {
            controller.start_round(remote.as_ref(), &remedial).map_err(|e| {
                anyhow::anyhow!("remedial round failed: {e}")
            })?;
            run_challenges(controller)?;
        }
    }

    if controller.finish_adventure_round() {
        println!("Level complete! The next leg of the journey is unlocked.");
    }
    Ok(())
}

fn run_challenges(controller: &mut SessionController<JsonFileStore>) -> Result<()> {
    let stdin = io::stdin();
    loop {
        let Some(round) = controller.round() else {
            break;
        };
        let index = round.index;
        show_prompt(controller, index)?;

        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        if let Some(answer) = controller.submit_answer(&input) {
            if answer.is_correct {
                println!("Correct!\n");
            } else {
                println!("Not quite. It was: {}\n", answer.expected);
            }
        }
        if !controller.advance() {
            break;
        }
    }

    if let Some(round) = controller.round() {
        println!(
            "Round over: {} / {} correct.",
            round.score.correct, round.score.total
        );
        for attempt in &round.score.history {
            if !attempt.is_correct {
                println!("  {} (you wrote: {})", attempt.word, attempt.user_spelling);
            }
        }
    }
    Ok(())
}

/// Local two-player mode: both players spell the same word in turn. Player 1
/// owns the device's mastery profile; player 2's attempts are not tracked.
fn run_duel(controller: &mut SessionController<JsonFileStore>) -> Result<()> {
    let stdin = io::stdin();
    let (mut p1_points, mut p2_points) = (0u32, 0u32);

    loop {
        let Some(round) = controller.round() else {
            break;
        };
        let index = round.index;
        let Some(expected) = round.set.answer(index).map(str::to_string) else {
            break;
        };
        show_prompt(controller, index)?;

        let mut attempts: Vec<DuelAttempt> = Vec::with_capacity(2);
        for player in 1..=2 {
            print!("Player {player} > ");
            io::stdout().flush()?;
            let started = Instant::now();
            let mut input = String::new();
            if stdin.lock().read_line(&mut input)? == 0 {
                return Ok(());
            }
            let trimmed = input.trim().to_string();
            attempts.push(DuelAttempt {
                is_correct: trimmed.to_lowercase() == expected.to_lowercase(),
                seconds: started.elapsed().as_secs_f64(),
                input: trimmed,
            });
        }

        let p1_input = attempts[0].input.clone();
        controller.submit_answer(&p1_input);

        match duel::resolve_round(&attempts[0], &attempts[1]) {
            DuelWinner::Player1 => {
                p1_points += 1;
                println!("Point to player 1!\n");
            }
            DuelWinner::Player2 => {
                p2_points += 1;
                println!("Point to player 2!\n");
            }
            DuelWinner::Draw => println!("No point. It was: {expected}\n"),
        }

        if !controller.advance() {
            break;
        }
    }

    println!("Final score: player 1: {p1_points}, player 2: {p2_points}.");
    if p1_points == p2_points {
        println!("A draw!");
    } else {
        println!("Player {} wins!", if p1_points > p2_points { 1 } else { 2 });
    }
    Ok(())
}

fn show_prompt(
    controller: &mut SessionController<JsonFileStore>,
    index: usize,
) -> Result<()> {
    // Copy the challenge out first; the scramble/mask helpers need the
    // controller mutably for its rng.
    enum Prompt {
        Homophone {
            sentence: String,
            definition: String,
            options: Vec<String>,
        },
        Word {
            variant: GameVariant,
            word: String,
            definition: String,
            example: String,
        },
    }

    let prompt_data = {
        let Some(round) = controller.round() else {
            return Ok(());
        };
        match &round.set {
            ChallengeSet::Homophones(homophones) => {
                let Some(c) = homophones.get(index) else {
                    return Ok(());
                };
                Prompt::Homophone {
                    sentence: c.sentence.clone(),
                    definition: c.definition.clone(),
                    options: c.options.clone(),
                }
            }
            ChallengeSet::Words(words) => {
                let Some(c) = words.get(index) else {
                    return Ok(());
                };
                Prompt::Word {
                    variant: round.variant,
                    word: c.word.clone(),
                    definition: c.definition.clone(),
                    example: c.example_sentence.clone(),
                }
            }
        }
    };

    match prompt_data {
        Prompt::Homophone {
            sentence,
            definition,
            options,
        } => {
            println!("{sentence}");
            println!("  hint: {definition}");
            println!("  options: {}", options.join(" / "));
        }
        Prompt::Word {
            variant,
            word,
            definition,
            example,
        } => match variant {
            GameVariant::Scramble => {
                println!("Unscramble: {}", controller.scrambled(&word));
                println!("  hint: {definition}");
            }
            GameVariant::MissingLetter => {
                println!("Fill in the blanks: {}", controller.masked(&word));
                println!("  hint: {definition}");
            }
            GameVariant::Reverse => {
                println!("Spell it BACKWARDS.");
                println!("  word hint: {definition}");
                println!("  example: {}", prompt::blank_word(&example, &word));
            }
            _ => {
                println!("Definition: {definition}");
                println!("Example: {}", prompt::blank_word(&example, &word));
            }
        },
    }
    Ok(())
}
