#![cfg(not(tarpaulin_include))]

use medcalc::config::Config;
use medcalc::editor::{self, EditorEvent, EditorMode, EditorState, update};
use medcalc::error::FilterError;
use medcalc::listing::{ListFilter, ListView};
use medcalc::store::CalculatorStore;
use medcalc::units::ConversionTable;
use std::io::{self, Write};
use std::time::Instant;

// Terminal front end for the calculator editor and list view.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let store = config.open_store()?;
    let table = ConversionTable::standard();

    let mut state = EditorState::new(EditorMode::Create);
    let mut start_time = Instant::now();
    let mut status = String::from("ok");

    loop {
        let elapsed_time = start_time.elapsed().as_secs_f64();
        print!("[{:.1}] ({}) {} > ", elapsed_time, status, state.mode.heading());
        io::stdout().flush()?;

        let mut command = String::new();
        if io::stdin().read_line(&mut command)? == 0 {
            break;
        }
        let command = command.trim();
        start_time = Instant::now();

        if command.is_empty() {
            status = String::from("invalid command");
            continue;
        }
        if command == "q" || command == "quit" {
            break;
        }
        if command == "help" {
            print_help();
            status = String::from("ok");
            continue;
        }

        let (verb, rest) = match command.split_once(' ') {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (command, ""),
        };

        status = match run_command(verb, rest, state.clone(), store.as_ref(), &table).await {
            Ok(next) => {
                state = next;
                String::from("ok")
            }
            Err(message) => message,
        };
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  q: Quit");
    println!("  new: Start a new calculator");
    println!("  load <id>: Edit a stored calculator");
    println!("  show: Print the form");
    println!("  name|short|long|extra|why|where|evidence <text>: Set a text field");
    println!("  popular|recent on|off: Set a category flag");
    println!("  tag <tag> / untag <tag>: Edit speciality tags");
    println!("  param <name> <symbol> <unit>[,<unit>...]: Add a parameter");
    println!("  rmparam <index>: Remove a parameter");
    println!("  units <query>: Search the unit catalog");
    println!("  formula <text>: Replace the formula");
    println!("  insert <symbol>: Insert at the cursor");
    println!("  value <symbol> <number> [unit]: Set a test value");
    println!("  eval: Evaluate the formula with the test values");
    println!("  preview expr|swift|java: Print a rendering of the formula");
    println!("  save: Create or update the calculator");
    println!("  list [all|popular|recent] [search]: List calculators");
    println!("  delete <id>: Delete a calculator");
}

async fn run_command(
    verb: &str,
    rest: &str,
    state: EditorState,
    store: &dyn CalculatorStore,
    table: &ConversionTable,
) -> Result<EditorState, String> {
    let text = rest.to_string();
    let state = match verb {
        "new" => EditorState::new(EditorMode::Create),
        "load" => {
            if rest.is_empty() {
                return Err(String::from("missing id"));
            }
            editor::load(store, Some(rest))
                .await
                .map_err(|e| e.to_string())?
        }
        "show" => {
            print_form(&state);
            state
        }
        "name" => update(state, EditorEvent::SetName(text)),
        "short" => update(state, EditorEvent::SetShortDescription(text)),
        "long" => update(state, EditorEvent::SetLongDescription(text)),
        "extra" => update(state, EditorEvent::SetAdditionalField(text)),
        "why" => update(state, EditorEvent::SetWhyToUse(text)),
        "where" => update(state, EditorEvent::SetWhereToUse(text)),
        "evidence" => update(state, EditorEvent::SetMedicalEvidences(text)),
        "popular" => update(state, EditorEvent::SetPopular(parse_flag(rest)?)),
        "recent" => update(state, EditorEvent::SetRecentlyAdded(parse_flag(rest)?)),
        "tag" => {
            let state = update(state, EditorEvent::SetNewTag(text));
            update(state, EditorEvent::AddTag)
        }
        "untag" => update(state, EditorEvent::RemoveTag(text)),
        "param" => add_parameter(state, rest)?,
        "rmparam" => {
            let index = rest.parse().map_err(|_| String::from("invalid index"))?;
            update(state, EditorEvent::RemoveParameter(index))
        }
        "units" => {
            let state = update(state, EditorEvent::SetUnitQuery(text));
            for unit in state.filtered_units() {
                println!("  {}", unit);
            }
            state
        }
        "formula" => update(state, EditorEvent::SetFormula(text)),
        "insert" => {
            let cursor = state.cursor;
            update(
                state,
                EditorEvent::InsertSymbol {
                    start: cursor,
                    end: cursor,
                    symbol: text,
                },
            )
        }
        "value" => set_value(state, rest)?,
        "eval" => {
            let state = editor::update_with(state, EditorEvent::EvaluateFormula, table);
            match (&state.test_result, &state.test_error) {
                (Some(result), _) => println!("Result: {:.2}", result),
                (None, Some(error)) => return Err(error.clone()),
                (None, None) => {}
            }
            state
        }
        "preview" => {
            let previews = state.previews(table);
            match rest {
                "" | "expr" => println!("{}", previews.evaluable),
                "swift" => println!("{}", previews.swift),
                "java" => println!("{}", previews.java),
                _ => return Err(String::from("unknown preview")),
            }
            state
        }
        "save" => {
            let id = editor::submit(store, &state.mode, &state.form)
                .await
                .map_err(|e| e.to_string())?;
            println!("Saved {}", id);
            // a created calculator is edited in place from now on
            EditorState {
                mode: EditorMode::Update(id),
                ..state
            }
        }
        "list" => {
            let (filter, search) = match rest.split_once(' ') {
                Some((filter, search)) => (filter, search.trim()),
                None => (rest, ""),
            };
            let filter: ListFilter = filter.parse().map_err(|e: FilterError| e.to_string())?;
            let view = ListView::load(store)
                .await
                .map_err(|_| String::from("Failed to load calculators"))?;
            for summary in view.visible(search, filter) {
                println!("  {}  {}  {}", summary.id, summary.name, summary.short_description);
            }
            state
        }
        "delete" => {
            let mut view = ListView::load(store)
                .await
                .map_err(|_| String::from("Failed to load calculators"))?;
            view.delete(store, rest)
                .await
                .map_err(|_| String::from("Failed to delete calculator. Please try again."))?;
            state
        }
        _ => return Err(String::from("invalid command")),
    };
    Ok(state)
}

fn parse_flag(arg: &str) -> Result<bool, String> {
    match arg {
        "on" | "yes" | "true" => Ok(true),
        "off" | "no" | "false" => Ok(false),
        _ => Err(String::from("expected on|off")),
    }
}

fn add_parameter(state: EditorState, rest: &str) -> Result<EditorState, String> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let [name, symbol, units] = parts[..] else {
        return Err(String::from("usage: param <name> <symbol> <units>"));
    };

    let mut state = update(state, EditorEvent::SetNewParameterName(name.to_string()));
    state = update(state, EditorEvent::SetNewParameterSymbol(symbol.to_string()));
    for unit in units.split(',').filter(|u| !u.is_empty()) {
        state = update(state, EditorEvent::ToggleNewParameterUnit(unit.to_string()));
    }
    Ok(update(state, EditorEvent::AddParameter))
}

fn set_value(state: EditorState, rest: &str) -> Result<EditorState, String> {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    let (symbol, value, unit) = match parts[..] {
        [symbol, value] => (symbol, value, None),
        [symbol, value, unit] => (symbol, value, Some(unit)),
        _ => return Err(String::from("usage: value <symbol> <number> [unit]")),
    };
    let value: f64 = value.parse().map_err(|_| String::from("invalid number"))?;

    let mut state = update(
        state,
        EditorEvent::SetParamValue {
            symbol: symbol.to_string(),
            value,
        },
    );
    if let Some(unit) = unit {
        state = update(
            state,
            EditorEvent::SetParamUnit {
                symbol: symbol.to_string(),
                unit: unit.to_string(),
            },
        );
    }
    Ok(state)
}

fn print_form(state: &EditorState) {
    let form = &state.form;
    println!("{}", state.mode.heading());
    println!("  name:       {}", form.name);
    println!("  short:      {}", form.short_description);
    println!("  long:       {}", form.long_description);
    println!(
        "  category:   popular={} recent={}",
        form.category.popular, form.category.recently_added
    );
    println!("  tags:       {}", form.speciality_tags.join(", "));
    println!("  extra:      {}", form.additional_field);
    println!("  why:        {}", form.why_to_use);
    println!("  where:      {}", form.where_to_use);
    for (index, param) in form.parameters.iter().enumerate() {
        println!(
            "  param[{}]:   {} ({}) [{}]",
            index,
            param.name,
            param.symbol,
            param.units.join(", ")
        );
    }
    println!("  formula:    {}", form.formula);
    println!("  evidence:   {}", form.medical_evidences);
    for (symbol, value) in &state.param_values {
        println!("  value {}:   {} {}", symbol, value.value, value.unit);
    }
}
