use std::path::PathBuf;

use sokofess_engine::coordinate_to_notation;
use sokofess_evaluator::{
    DeadlockDetector, DeadlockMode, FeatureCalculator, LevelAnalysis, feature,
    room::DEFAULT_MIN_ROOM_SIZE,
};

use crate::util;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct AnalyzeArg {
    /// Level file in the common text format
    level: PathBuf,
    /// Smallest open area counted as a room
    #[arg(long, default_value_t = DEFAULT_MIN_ROOM_SIZE)]
    min_room_size: usize,
    /// Judge the initial state with all five deadlock techniques
    #[arg(long)]
    aggressive_deadlocks: bool,
}

pub(crate) fn run(arg: &AnalyzeArg) -> anyhow::Result<()> {
    let AnalyzeArg {
        level: level_path,
        min_room_size,
        aggressive_deadlocks,
    } = arg;

    let level = util::read_level(level_path)?;
    let analysis = LevelAnalysis::with_min_room_size(&level, *min_room_size);
    let board = analysis.board();
    let state = level.initial_state();

    println!("Level: {}", level_path.display());
    print!("{}", board.render(state));
    println!(
        "Size: {}x{}, {} boxes, {} targets, {} dead squares",
        board.width(),
        board.height(),
        state.box_count(),
        board.targets().len(),
        analysis.push_reach().dead_square_count()
    );

    let rooms = analysis.rooms();
    println!("Rooms ({}):", rooms.rooms().len());
    for room in rooms.rooms() {
        println!(
            "  room {}: {} squares, {} targets",
            room.id(),
            room.size(),
            room.target_count()
        );
    }
    println!("Connections ({}):", rooms.connections().len());
    for connection in rooms.connections() {
        let (a, b) = connection.rooms();
        let squares: Vec<String> = connection
            .squares()
            .iter()
            .map(|pos| coordinate_to_notation(*pos))
            .collect();
        println!(
            "  room {a} <-> room {b}: {} {}",
            connection.kind(),
            squares.join(" ")
        );
    }

    let plan = analysis.plan();
    println!("Packing plan:");
    match plan.order() {
        Some(order) => {
            let order: Vec<String> = order.iter().map(|pos| coordinate_to_notation(*pos)).collect();
            println!("  order: {}", order.join(" "));
        }
        None => println!("  order: none (packing counts boxes on targets)"),
    }
    match plan.sink() {
        Some(sink) => println!(
            "  sink: target {}, {} squares{}",
            coordinate_to_notation(sink.target()),
            sink.size(),
            plan.sink_room()
                .map(|room| format!(", room {room}"))
                .unwrap_or_default()
        ),
        None => println!("  sink: none"),
    }

    let calculator = FeatureCalculator::new(&analysis);
    let state_analysis = calculator.analyze(state);
    println!(
        "Initial features: {}",
        FeatureCalculator::vector_of(&state_analysis)
    );
    for source in feature::all_feature_sources() {
        println!(
            "  {:<20} {:>4}  ({:?})",
            source.name(),
            source.extract_raw(&state_analysis),
            source.signal()
        );
    }
    if let Some(hotspot) = rooms.find_most_disruptive_hotspot(board, state) {
        println!(
            "Most disruptive hotspot: {}",
            coordinate_to_notation(hotspot)
        );
    }

    let mode = if *aggressive_deadlocks {
        DeadlockMode::Aggressive
    } else {
        DeadlockMode::Conservative
    };
    let detector = DeadlockDetector::new(&analysis, mode);
    match detector.detect(state) {
        Some(technique) => println!("Deadlock ({mode}): detected by {technique}"),
        None => println!("Deadlock ({mode}): none detected"),
    }
    Ok(())
}
