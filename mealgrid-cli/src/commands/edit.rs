//! Line-oriented plan editor.
//!
//! Each input line is one gesture or command, parsed with clap:
//!
//! ```text
//! > main 1-dinner "green curry" --portion 3
//! > leftover 1-dinner
//! > drag leftover:4 slot:2-lunch
//! > suggest swap tuesday lunch for something lighter
//! > apply
//! ```

use clap::{Args, Parser, Subcommand};
use std::error::Error;
use std::io::{self, BufRead, Write};

use super::display::{recipe_title, write_grid, write_leftovers};
use super::plan::parse_plan_id;
use crate::catalog::load_catalog;
use crate::config::Config;
use crate::suggestion_client::{SuggestionClient, SuggestionClientError};
use mealgrid_core::{
    nutrition, DishRole, DropOutcome, FilePlanStore, MealSlotKey, MemoryCatalog, PlanSession,
    ReceiveOutcome, RecipeId, Resolution, SubstringResolver, TitleResolver,
};

#[derive(Args)]
pub struct EditCommand {
    /// Meal plan ID (UUID)
    pub id: String,
}

impl EditCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn Error>> {
        let id = parse_plan_id(&self.id)?;
        let store = FilePlanStore::new(config.plans_dir());
        let session = PlanSession::load(&id, Box::new(store), config.history_depth.value)?;
        let catalog = load_catalog(&config.catalog_path.value)?;
        let client = match SuggestionClient::from_config(&config.suggestion) {
            Ok(client) => Some(client),
            Err(SuggestionClientError::NotConfigured) => None,
            Err(e) => return Err(e.into()),
        };

        println!("Editing plan {}. Type 'help' for commands, 'quit' to leave.", id);
        let mut editor = Editor::new(session, catalog, client);
        let stdin = io::stdin();
        editor.run(stdin.lock(), &mut io::stdout())
    }
}

#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct EditLine {
    #[command(subcommand)]
    action: EditAction,
}

#[derive(Subcommand)]
enum EditAction {
    /// Set the main dish of a slot (e.g. 1-dinner)
    Main {
        slot: MealSlotKey,
        /// Recipe ID or title
        recipe: String,
        #[arg(long, default_value_t = 1)]
        portion: u32,
        #[arg(long, default_value_t = 1)]
        serving: u32,
    },

    /// Set the side dish of a slot that has a main
    Side {
        slot: MealSlotKey,
        /// Recipe ID or title
        recipe: String,
        #[arg(long, default_value_t = 1)]
        portion: u32,
        #[arg(long, default_value_t = 1)]
        serving: u32,
    },

    /// Remove the main (or --side) of a slot
    Remove {
        slot: MealSlotKey,
        #[arg(long)]
        side: bool,
    },

    /// Bank the extra portions of a dish as leftovers
    Leftover {
        slot: MealSlotKey,
        #[arg(long)]
        side: bool,
        /// Stop banking instead
        #[arg(long)]
        off: bool,
    },

    /// Change how many portions a dish is cooked in
    Portion {
        slot: MealSlotKey,
        portion: u32,
        #[arg(long)]
        side: bool,
    },

    /// Change the serving multiplier of a dish
    Serving {
        slot: MealSlotKey,
        serving: u32,
        #[arg(long)]
        side: bool,
    },

    /// Move a slot onto another, swapping mains if the target is taken
    Move {
        source: MealSlotKey,
        target: MealSlotKey,
    },

    /// Place one banked leftover portion in a slot
    Consume {
        slot: MealSlotKey,
        /// Recipe ID or title
        recipe: String,
    },

    /// Drag a payload (catalog:<id>, leftover:<id>, slot:<day>-<meal>) onto a slot
    Drag { source: String, target: String },

    /// Undo the last edit
    Undo,

    /// Redo the last undone edit
    Redo,

    /// Show the plan, with any previewed suggestion
    Show,

    /// Show nutrition totals
    Totals { day: Option<u32> },

    /// Show banked leftovers
    Leftovers,

    /// Ask the suggestion service for changes
    Suggest {
        #[arg(required = true, trailing_var_arg = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List the items of the previewed suggestion
    Preview,

    /// Point a previewed item at a recipe
    Resolve {
        /// Item number as listed by 'preview'
        index: usize,
        /// Recipe ID or title
        recipe: String,
    },

    /// Merge the previewed suggestion into the plan
    Apply,

    /// Drop the previewed suggestion
    Discard,

    /// Leave the editor
    #[command(alias = "exit")]
    Quit,
}

fn role(side: bool) -> DishRole {
    if side {
        DishRole::Side
    } else {
        DishRole::Main
    }
}

/// Splits a line on whitespace, keeping double-quoted text together.
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut started = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                started = true;
            }
            c if c.is_whitespace() && !quoted => {
                if started {
                    words.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        words.push(current);
    }
    words
}

enum Flow {
    Continue,
    Quit,
}

pub struct Editor {
    session: PlanSession,
    catalog: MemoryCatalog,
    client: Option<SuggestionClient>,
}

impl Editor {
    pub fn new(session: PlanSession, catalog: MemoryCatalog, client: Option<SuggestionClient>) -> Self {
        Self {
            session,
            catalog,
            client,
        }
    }

    pub fn session(&self) -> &PlanSession {
        &self.session
    }

    /// Reads commands from `input` until it ends or `quit` is entered.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<(), Box<dyn Error>> {
        write!(out, "> ")?;
        out.flush()?;

        for line in input.lines() {
            let line = line?;
            let words = split_words(&line);
            if !words.is_empty() {
                match EditLine::try_parse_from(words) {
                    Ok(parsed) => match self.execute(parsed.action, out) {
                        Ok(Flow::Quit) => break,
                        Ok(Flow::Continue) => {}
                        Err(e) => writeln!(out, "Error: {}", e)?,
                    },
                    Err(e) => write!(out, "{}", e)?,
                }
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    /// Accepts a recipe id as is; anything else is matched against titles.
    fn recipe_id(&self, reference: &str) -> Result<RecipeId, String> {
        if let Ok(id) = reference.parse::<RecipeId>() {
            return Ok(id);
        }
        SubstringResolver::new(&self.catalog)
            .resolve(reference)
            .ok_or_else(|| format!("Recipe not found: {}", reference))
    }

    fn title(&self, id: RecipeId) -> String {
        recipe_title(&self.catalog, id)
    }

    fn execute<W: Write>(&mut self, action: EditAction, out: &mut W) -> Result<Flow, Box<dyn Error>> {
        match action {
            EditAction::Main {
                slot,
                recipe,
                portion,
                serving,
            } => {
                let id = self.recipe_id(&recipe)?;
                self.session.set_main(slot, id, portion, serving)?;
                writeln!(out, "Main of {} set to {}", slot, self.title(id))?;
            }

            EditAction::Side {
                slot,
                recipe,
                portion,
                serving,
            } => {
                let id = self.recipe_id(&recipe)?;
                if self.session.set_side(slot, id, portion, serving)? {
                    writeln!(out, "Side of {} set to {}", slot, self.title(id))?;
                } else {
                    writeln!(out, "{} has no main; add a main first", slot)?;
                }
            }

            EditAction::Remove { slot, side } => {
                let removed = if side {
                    self.session.remove_side(slot)?
                } else {
                    self.session.remove_main(slot)?
                };
                match removed {
                    Some(dish) => {
                        writeln!(out, "Removed {} from {}", self.title(dish.recipe_id), slot)?
                    }
                    None => writeln!(out, "No {} at {}", role(side), slot)?,
                }
            }

            EditAction::Leftover { slot, side, off } => {
                let role = role(side);
                let changed = self.session.set_leftover_flag(slot, role, !off)?;
                let dish = self.session.grid().dish(slot, role).cloned();
                match dish {
                    Some(dish) if changed && !off => writeln!(
                        out,
                        "Banked {} leftover portion(s) of {}",
                        self.session.grid().leftovers().remaining(dish.recipe_id),
                        self.title(dish.recipe_id)
                    )?,
                    Some(dish) if changed => {
                        writeln!(out, "Stopped banking leftovers of {}", self.title(dish.recipe_id))?
                    }
                    _ if off => writeln!(out, "The {} at {} is not banking leftovers", role, slot)?,
                    _ => writeln!(
                        out,
                        "The {} at {} cannot bank leftovers: it needs more than one portion and must not be a leftover itself",
                        role, slot
                    )?,
                }
            }

            EditAction::Portion {
                slot,
                portion,
                side,
            } => {
                self.session.set_portion(slot, role(side), portion)?;
                writeln!(out, "The {} at {} now makes {} portion(s)", role(side), slot, portion)?;
            }

            EditAction::Serving {
                slot,
                serving,
                side,
            } => {
                self.session.set_serving(slot, role(side), serving)?;
                writeln!(out, "The {} at {} now serves x{}", role(side), slot, serving)?;
            }

            EditAction::Move { source, target } => {
                if self.session.move_slot(source, target)? {
                    writeln!(out, "Moved {} to {}", source, target)?;
                } else {
                    writeln!(out, "Nothing to move")?;
                }
            }

            EditAction::Consume { slot, recipe } => {
                let id = self.recipe_id(&recipe)?;
                if self.session.consume_leftover(slot, id)? {
                    writeln!(out, "Placed a leftover portion of {} at {}", self.title(id), slot)?;
                } else {
                    writeln!(out, "No leftovers of {} banked", self.title(id))?;
                }
            }

            EditAction::Drag { source, target } => {
                let message = match self.session.drag_and_drop(&source, &target) {
                    DropOutcome::PlacedMain => "Placed as main",
                    DropOutcome::PlacedSide => "Placed as side",
                    DropOutcome::ConsumedLeftover(DishRole::Main) => "Leftover placed as main",
                    DropOutcome::ConsumedLeftover(DishRole::Side) => "Leftover placed as side",
                    DropOutcome::Moved => "Moved",
                    DropOutcome::Swapped => "Swapped mains",
                    DropOutcome::Ignored => "Nothing happened",
                };
                writeln!(out, "{}", message)?;
            }

            EditAction::Undo => {
                let done = self.session.undo()?;
                writeln!(out, "{}", if done { "Undone" } else { "Nothing to undo" })?;
            }

            EditAction::Redo => {
                let done = self.session.redo()?;
                writeln!(out, "{}", if done { "Redone" } else { "Nothing to redo" })?;
            }

            EditAction::Show => {
                let session = &self.session;
                write_grid(out, session.days(), &self.catalog, |key| session.view(key))?;
                if let Some(preview) = session.preview() {
                    writeln!(out, "Previewing: {}", preview.summary())?;
                    writeln!(out, "Use 'apply' or 'discard'; the plan is read-only until then.")?;
                }
            }

            EditAction::Totals { day } => match day {
                Some(day) => {
                    if day == 0 || day > self.session.days() {
                        return Err(format!(
                            "Day {} is outside the plan ({} day(s))",
                            day,
                            self.session.days()
                        )
                        .into());
                    }
                    writeln!(out, "Day {}: {}", day, self.session.day_totals(&self.catalog, day))?;
                }
                None => {
                    let grid = self.session.grid();
                    for (day, totals) in nutrition::plan_totals(grid, &self.catalog, self.session.days()) {
                        writeln!(out, "Day {}: {}", day, totals)?;
                    }
                }
            },

            EditAction::Leftovers => {
                write_leftovers(out, self.session.grid().leftovers(), &self.catalog)?;
            }

            EditAction::Suggest { text } => {
                let client = self
                    .client
                    .as_ref()
                    .ok_or(SuggestionClientError::NotConfigured)?;
                let (ticket, request) = self
                    .session
                    .request_suggestion(&text.join(" "), &self.catalog)?;
                writeln!(out, "Asking {}...", client.endpoint())?;
                out.flush()?;

                let response = match client.request(&request) {
                    Ok(response) => response,
                    Err(e) => {
                        self.session.cancel_suggestion();
                        return Err(e.into());
                    }
                };

                let resolver = SubstringResolver::new(&self.catalog);
                match self.session.receive_suggestion(ticket, &response, &resolver)? {
                    ReceiveOutcome::Previewing { .. } => {
                        if !response.summary_text.is_empty() {
                            writeln!(out, "{}", response.summary_text)?;
                        }
                        self.write_preview(out)?;
                    }
                    ReceiveOutcome::Empty => writeln!(out, "No usable suggestions for this plan")?,
                    ReceiveOutcome::Stale => writeln!(out, "Suggestion arrived too late and was dropped")?,
                }
            }

            EditAction::Preview => self.write_preview(out)?,

            EditAction::Resolve { index, recipe } => {
                let count = self.session.preview().map_or(0, |p| p.items().len());
                if index == 0 || index > count {
                    return Err(format!("No preview item {}", index).into());
                }
                let id = self.recipe_id(&recipe)?;
                self.session.resolve_preview_item(index - 1, id)?;
                writeln!(out, "Item {} now uses {}", index, self.title(id))?;
            }

            EditAction::Apply => {
                let report = self.session.apply_preview()?;
                writeln!(out, "Applied {} meal(s)", report.applied.len())?;
                if !report.unresolved.is_empty() {
                    let titles: Vec<&str> =
                        report.unresolved.iter().map(|item| item.title.as_str()).collect();
                    writeln!(out, "Skipped, not in catalog: {}", titles.join(", "))?;
                }
            }

            EditAction::Discard => {
                self.session.discard_preview()?;
                writeln!(out, "Suggestion discarded")?;
            }

            EditAction::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn write_preview<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let Some(preview) = self.session.preview() else {
            return writeln!(out, "No suggestion is being previewed");
        };
        for (i, item) in preview.items().iter().enumerate() {
            let recipe = match item.recipe {
                Resolution::Resolved(id) => format!("{} (#{})", self.title(id), id),
                Resolution::Unresolved => format!("'{}' NOT FOUND", item.title),
            };
            writeln!(out, "  {}. {}: {}", i + 1, item.key, recipe)?;
        }
        let unresolved = preview.unresolved().count();
        if unresolved > 0 {
            writeln!(
                out,
                "{} item(s) not found; use 'resolve <n> <recipe>' or they will be skipped",
                unresolved
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealgrid_core::{MealTime, MemoryPlanStore, PlanSnapshot, Recipe};
    use std::io::Cursor;

    fn key(day: u32, meal_time: MealTime) -> MealSlotKey {
        MealSlotKey::new(day, meal_time).unwrap()
    }

    fn editor() -> Editor {
        let session = PlanSession::open(
            PlanSnapshot::new("Week", 3),
            Box::new(MemoryPlanStore::new()),
            50,
        )
        .unwrap();
        let catalog = MemoryCatalog::new(vec![
            Recipe::new(1, "Chili"),
            Recipe::new(2, "Rice"),
            Recipe::new(3, "Porridge"),
        ]);
        Editor::new(session, catalog, None)
    }

    fn run(editor: &mut Editor, script: &str) -> String {
        let mut out = Vec::new();
        editor.run(Cursor::new(script), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words(r#"main 1-dinner "green  curry" --portion 3"#),
            vec!["main", "1-dinner", "green  curry", "--portion", "3"]
        );
        assert_eq!(split_words("   "), Vec::<String>::new());
        assert_eq!(split_words(r#"resolve 1 """#), vec!["resolve", "1", ""]);
    }

    #[test]
    fn test_edit_script() {
        let mut editor = editor();
        let output = run(
            &mut editor,
            "main 1-dinner chili --portion 3\n\
             side 1-dinner 2\n\
             leftover 1-dinner\n\
             drag leftover:1 slot:2-lunch\n\
             leftovers\n",
        );

        assert!(output.contains("Main of 1-dinner set to Chili"));
        assert!(output.contains("Side of 1-dinner set to Rice"));
        assert!(output.contains("Banked 2 leftover portion(s) of Chili"));
        assert!(output.contains("Leftover placed as main"));
        assert!(output.contains("Chili (#1): 1 portion(s) at serving 1"));

        let grid = editor.session().grid();
        let consumed = grid.dish(key(2, MealTime::Lunch), DishRole::Main).unwrap();
        assert!(consumed.is_from_leftover);
        assert_eq!(grid.leftovers().remaining(RecipeId(1)), 1);
    }

    #[test]
    fn test_undo_redo_and_quit() {
        let mut editor = editor();
        let output = run(
            &mut editor,
            "main 1-lunch porridge\nundo\nundo\nredo\nquit\nmain 2-lunch rice\n",
        );

        assert!(output.contains("Undone"));
        assert!(output.contains("Nothing to undo"));
        assert!(output.contains("Redone"));
        let grid = editor.session().grid();
        assert!(grid.get(key(1, MealTime::Lunch)).is_some());
        assert!(grid.get(key(2, MealTime::Lunch)).is_none());
    }

    #[test]
    fn test_errors_do_not_end_the_session() {
        let mut editor = editor();
        let output = run(
            &mut editor,
            "main 9-lunch chili\nmain 1-brunch chili\nmain 1-lunch pizza\nportion 1-lunch 2\nbogus\nmain 1-lunch rice\n",
        );

        assert!(output.contains("Error: Day 9 is outside the plan (3 day(s))"));
        assert!(output.contains("Error: Recipe not found: pizza"));
        assert!(output.contains("Error: No main dish at 1-lunch"));
        assert!(output.contains("Main of 1-lunch set to Rice"));
        assert_eq!(editor.session().grid().len(), 1);
    }

    #[test]
    fn test_suggest_without_service_leaves_gate_open() {
        let mut editor = editor();
        let output = run(&mut editor, "suggest something lighter\npreview\n");

        assert!(output.contains("Suggestion service not configured"));
        assert!(output.contains("No suggestion is being previewed"));

        let catalog = MemoryCatalog::default();
        assert!(editor.session.request_suggestion("again", &catalog).is_ok());
    }

    #[test]
    fn test_apply_and_discard_need_a_preview() {
        let mut editor = editor();
        let output = run(&mut editor, "apply\ndiscard\nresolve 1 chili\n");

        assert!(output.contains("Error: No suggestion is being previewed"));
        assert!(output.contains("Error: No preview item 1"));
    }

    #[test]
    fn test_show_and_totals() {
        let mut editor = editor();
        let output = run(&mut editor, "main 1-breakfast porridge --serving 2\nshow\ntotals 1\ntotals 5\n");

        assert!(output.contains("breakfast  Porridge x1 (serving 2)"));
        assert!(output.contains("Day 1: 0 kcal"));
        assert!(output.contains("Error: Day 5 is outside the plan (3 day(s))"));
    }
}
