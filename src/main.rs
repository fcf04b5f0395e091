//! LiteForge CLI
//!
//! A demonstration CLI for the LiteForge library.

use liteforge::prelude::*;
use liteforge::validation::parse_rule_list;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    std::process::exit(run(&args));
}

/// Run a command line and return the process exit code.
fn run(args: &[String]) -> i32 {
    let program = args.first().map(String::as_str).unwrap_or("liteforge");
    let Some(command) = args.get(1) else {
        print_usage(program);
        return 0;
    };

    match command.as_str() {
        "check" => match args.get(2) {
            Some(path) => check_config(path),
            None => {
                eprintln!("Error: Please specify a configuration file");
                2
            }
        },
        "validate" => validate(&args[2..]),
        "demo" => demo(args.get(2).map(String::as_str)),
        "help" | "--help" | "-h" => {
            print_usage(program);
            0
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage(program);
            2
        }
    }
}

fn print_usage(program: &str) {
    println!("🔨 LiteForge v{}", liteforge::VERSION);
    println!();
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  check <config>                 Load a configuration file and print the result");
    println!("  validate <field=rules>... -- <key=value>...");
    println!("                                 Validate values and print the JSON report");
    println!("  demo [config]                  Run a users controller against an in-memory database");
    println!("  help                           Show this help message");
    println!();
    println!("Rules are separated by ',' or '|', e.g. email=required,email");
}

fn check_config(path: &str) -> i32 {
    match AppConfig::load(path) {
        Ok(config) => match toml::to_string_pretty(&config) {
            Ok(text) => {
                println!("✅ {} is valid", path);
                println!();
                print!("{}", text);
                0
            }
            Err(e) => {
                eprintln!("❌ Could not render configuration: {}", e);
                1
            }
        },
        Err(e) => {
            let e = ForgeError::from(e);
            eprintln!("❌ {}", e);
            if let Some(fix) = e.suggested_fix() {
                eprintln!("   Hint: {}", fix);
            }
            1
        }
    }
}

fn validate(args: &[String]) -> i32 {
    liteforge::logging::init(&Default::default());

    let split = args.iter().position(|a| a == "--").unwrap_or(args.len());
    let (rule_args, data_args) = args.split_at(split);
    let data_args = data_args.get(1..).unwrap_or_default();

    let mut engine = RuleEngine::new();
    for arg in rule_args {
        match arg.split_once('=') {
            Some((field, rules)) => {
                engine.add_rule(field, parse_rule_list(rules));
            }
            None => {
                eprintln!("Error: expected field=rules, got '{}'", arg);
                return 2;
            }
        }
    }

    let mut data = Fields::new();
    for arg in data_args {
        match arg.split_once('=') {
            Some((key, value)) => {
                data.insert(key.to_string(), Value::from(value));
            }
            None => {
                eprintln!("Error: expected key=value, got '{}'", arg);
                return 2;
            }
        }
    }

    let report = engine.validate(&data);
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("❌ Could not render report: {}", e);
            return 1;
        }
    }
    eprintln!("{}", report.summary());

    if report.is_valid() {
        0
    } else {
        1
    }
}

// ============================================================================
// Demo
// ============================================================================

/// Users controller used by the demo command.
struct UsersController {
    model: Model,
    rules: RuleEngine,
    flash: FlashBag,
    base_url: String,
    redirect: Option<Redirect>,
}

impl Controller for UsersController {
    fn actions() -> ActionTable<Self> {
        ActionTable::new()
            .with("index", |c: &mut UsersController, _: &[Value]| {
                for user in c.model.get_all("users")? {
                    println!("   • #{} {} <{}>", user["id"], user["name"], user["email"]);
                }
                Ok(())
            })
            .with("store", |c: &mut UsersController, params: &[Value]| {
                let data = fields(
                    ["name", "email", "password"]
                        .into_iter()
                        .zip(params.iter().cloned()),
                );
                let report = c.rules.validate(&data);
                if !report.is_valid() {
                    for (field, messages) in report.iter() {
                        println!("   ✗ {}: {}", field, messages.join(" "));
                    }
                    c.flash.set("Please fix the errors below.", MessageKind::Error);
                    return Ok(());
                }
                c.model.insert("users", &data)?;
                c.redirect = Some(Redirect::with_message(
                    "/users",
                    &c.base_url,
                    &mut c.flash,
                    "User created.",
                    MessageKind::Success,
                ));
                Ok(())
            })
            .with("show", |c: &mut UsersController, params: &[Value]| {
                let id = params.first().cloned().unwrap_or_default();
                match c.model.get_by_id("users", id.clone())? {
                    Some(user) => println!("   {}", serde_json::to_string(&user)?),
                    None => anyhow::bail!("user {} does not exist", id),
                }
                Ok(())
            })
            .with("destroy", |c: &mut UsersController, params: &[Value]| {
                let id = params.first().cloned().unwrap_or_default();
                c.model.delete("users", id)?;
                Ok(())
            })
    }
}

fn demo(config_path: Option<&str>) -> i32 {
    let config = match config_path.map(|p| AppConfig::load(p)).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("❌ {}", e);
            return 1;
        }
    };
    liteforge::logging::init(&config.log);

    let db = match Database::open(&config.database) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{}", ErrorBoundary::handle(&e));
            return 1;
        }
    };
    if let Err(e) = db.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            password TEXT NOT NULL
        );",
    ) {
        eprintln!("{}", ErrorBoundary::handle(&e));
        return 1;
    }

    let mut dependencies = Dependencies::new();
    dependencies.insert("db", db);
    let context = RequestContext::new(dependencies);

    let db = match context.dependency::<Database>("db") {
        Ok(db) => db,
        Err(e) => {
            eprintln!("{}", ErrorBoundary::handle(&e));
            return 1;
        }
    };

    let mut rules = RuleEngine::new();
    rules
        .set_unknown_policy(config.validation.unknown_rules)
        .add_rule("name", ["required"])
        .add_rule("email", ["required", "email", "max_length"])
        .add_rule("password", ["required", "min_length"])
        .set_error_message("email", "Please provide a valid email address.");

    let mut controller = UsersController {
        model: Model::new((*db).clone()),
        rules,
        flash: context.flash.clone(),
        base_url: config.base_url.clone(),
        redirect: None,
    };

    let requests: [(&str, Vec<Value>); 6] = [
        ("store", vec!["Ana".into(), "ana@example.com".into(), "hunter22".into()]),
        ("store", vec!["Bo".into(), "not-an-email".into(), "123".into()]),
        ("index", vec![]),
        ("show", vec![Value::Integer(42)]),
        ("destroy", vec![Value::Integer(1)]),
        ("export", vec![]),
    ];

    for (action, params) in requests {
        println!("→ {} {:?}", action, params.iter().map(|p| p.to_string()).collect::<Vec<_>>());

        let options = DispatchOptions::from(&config.dispatch).with_trace(|event| {
            if let PipelineEvent::Halted { stage, .. } = event {
                println!("   ⏹  halted at {}", stage);
            }
        });
        let mut dispatcher = Dispatcher::for_controller(controller).with_options(options);

        let logged_in = true;
        dispatcher.register_middleware(move || logged_in);
        // Deleting users is reserved for administrators.
        dispatcher.register_before_filter("destroy", || false);
        dispatcher.register_after_filter("store", || {
            log::debug!("store finished");
            true
        });

        if let Err(message) = ErrorBoundary::run(|| dispatcher.execute(action, &params)) {
            println!("   ⚠️  {}", message);
        }

        controller = dispatcher.into_controller();
        if let Some(redirect) = controller.redirect.take() {
            println!("   ↪ {} {}", redirect.status, redirect.location);
        }
        if controller.flash.has_message() {
            println!("   {}", controller.flash.display());
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    #[test]
    fn test_usage_errors_exit_with_two() {
        assert_eq!(run(&args(&["liteforge", "check"])), 2);
        assert_eq!(run(&args(&["liteforge", "frobnicate"])), 2);
    }

    #[test]
    fn test_check_reports_unreadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert_eq!(run(&args(&["liteforge", "check", missing.to_str().unwrap()])), 1);
    }

    #[test]
    fn test_help_succeeds() {
        assert_eq!(run(&args(&["liteforge"])), 0);
        assert_eq!(run(&args(&["liteforge", "help"])), 0);
    }
}
