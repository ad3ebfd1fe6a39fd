use bj_opt::deck::Pile;
use bj_opt::game::Game;
use bj_opt::optimizer;
use bj_opt::strategy::{AlwaysHit, AlwaysStay, BasicOptimized, SecondOptimized, Strategy, Third};
use clap::{crate_description, crate_name, crate_version, App, Arg};
use rand::rngs::StdRng;
use rand::SeedableRng;

// optimizer sample sizes: a cheap first screen, then two bigger re-checks
const OPT_N: u32 = 64;
const OPT_N_SECONDARY: u32 = 256;
const OPT_N_TERTIARY: u32 = 1024;
// only used when parameters are randomized instead of enumerated
const OPT_MAX_ITERATIONS: u32 = 70_000;
// rounds played by --test
const TEST_ROUNDS: u32 = 420_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .arg(
            Arg::with_name("basicopt")
                .short("b")
                .long("basicopt")
                .help("Use the BasicOptimized strategy for the player (default)"),
        )
        .arg(
            Arg::with_name("second")
                .short("2")
                .long("second")
                .help("Use the SecondOptimized strategy for the player"),
        )
        .arg(
            Arg::with_name("third")
                .short("3")
                .long("third")
                .help("Use the Third strategy for the player"),
        )
        .arg(
            Arg::with_name("alwayshit")
                .short("a")
                .long("always-hit")
                .help("Use a strategy where the player always hits"),
        )
        .arg(
            Arg::with_name("alwaysstay")
                .short("s")
                .long("always-stay")
                .help("Use a strategy where the player always stays"),
        )
        .arg(
            Arg::with_name("test")
                .short("t")
                .long("test")
                .help("Quickly test the current strategy"),
        )
        .arg(
            Arg::with_name("noshuffle")
                .short("n")
                .long("noshuffle")
                .help("Don't shuffle the cards"),
        )
        .arg(
            Arg::with_name("optimize")
                .short("o")
                .long("optimize")
                .help("Optimize the parameters of the chosen strategy"),
        )
        .arg(
            Arg::with_name("random")
                .short("r")
                .long("random")
                .help("Randomize parameters when optimizing them"),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Output detailed information about the games"),
        )
        .arg(
            Arg::with_name("json")
                .long("json")
                .help("Emit test and optimizer results as JSON"),
        )
        .arg(
            Arg::with_name("FILE")
                .help("Deck file: lines of comma separated cards like H7, S10")
                .index(1),
        )
        .get_matches();

    let mut strat: Box<dyn Strategy> = if matches.is_present("second") {
        Box::new(SecondOptimized::new())
    } else if matches.is_present("third") {
        Box::new(Third)
    } else if matches.is_present("alwayshit") {
        Box::new(AlwaysHit)
    } else if matches.is_present("alwaysstay") {
        Box::new(AlwaysStay)
    } else {
        Box::new(BasicOptimized::new())
    };

    let mut rng = StdRng::from_entropy();
    let verbose = matches.is_present("verbose");
    let json = matches.is_present("json");

    if matches.is_present("optimize") {
        let ranking = optimizer::run(
            strat.as_mut(),
            OPT_N,
            OPT_N_SECONDARY,
            OPT_N_TERTIARY,
            matches.is_present("random"),
            OPT_MAX_ITERATIONS,
            &mut rng,
        )?;
        if json {
            println!("{}", serde_json::to_string_pretty(&ranking.into_sorted())?);
        } else {
            for entry in ranking.into_sorted() {
                println!("{:.6}: {}", entry.ratio, entry.strategy);
            }
        }
        return Ok(());
    }

    if matches.is_present("test") {
        let stats = optimizer::evaluate(strat.as_ref(), TEST_ROUNDS, &mut rng)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Current strategy: {}", strat);
            println!(
                "After {} iterations, the player wins {:.6}% of the rounds.",
                TEST_ROUNDS,
                stats.ratio() * 100.0
            );
        }
        return Ok(());
    }

    // play a single round
    let mut deck = match matches.value_of("FILE") {
        Some(path) => {
            let deck = Pile::from_path(path)?;
            if verbose {
                println!("Loaded deck from {}", path);
            }
            deck
        }
        None => Pile::standard(),
    };
    if !matches.is_present("noshuffle") {
        deck.shuffle(&mut rng);
    }
    let mut game = Game::new(deck, strat, verbose);
    let outcome = game.one_round(&mut rng)?;
    println!("{}", game.summary(outcome));
    Ok(())
}
