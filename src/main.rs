use costpath::min_cost_path::problem::ProblemFile;
use costpath::min_cost_path::OptimizationModel;
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let path = match std::env::args_os().nth(1) {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("usage: costpath <problem.yaml>");
            return ExitCode::from(2);
        }
    };

    let problem = match ProblemFile::from_path(&path) {
        Ok(problem) => problem,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let graph = match problem.to_graph() {
        Ok(graph) => graph,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    graph.draw();

    let mut model = match OptimizationModel::new(
        &graph,
        &problem.start,
        &problem.target,
        problem.budget,
        problem.config,
    ) {
        Ok(model) => model,
        Err(e) => {
            error!("invalid model: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match model.solve() {
        Ok(path) => {
            println!("{}", path);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
