//! Train command - solve the MDP with a chosen solver and write the policy

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};

use crate::{
    agents::{
        PolicyIterationAgent, PolicyIterationConfig, QLearningAgent, QLearningConfig,
        ValueIterationAgent, ValueIterationConfig,
    },
    env::TttEnvironment,
    mdp::{Rewards, TttMdp},
    observer::ProgressObserver,
    policy::serialization::save_policy,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Solver {
    /// Policy iteration: evaluate and improve until a fixed point
    PolicyIteration,
    /// Value iteration: a fixed budget of Bellman-optimality sweeps
    ValueIteration,
    /// Q-learning: simulated episodes against a random opponent
    QLearning,
}

#[derive(Debug, Parser)]
pub struct TrainArgs {
    /// Solver to run
    #[arg(long, value_enum, default_value = "value-iteration")]
    pub solver: Solver,

    /// Where to write the trained policy (.json or .msgpack)
    #[arg(long, short)]
    pub output: PathBuf,

    /// Discount factor gamma
    #[arg(long, default_value_t = 0.9)]
    pub discount: f64,

    /// Policy-evaluation convergence threshold (policy iteration)
    #[arg(long, default_value_t = 0.1)]
    pub delta: f64,

    /// Number of sweeps (value iteration)
    #[arg(long, default_value_t = 50)]
    pub sweeps: usize,

    /// Learning rate alpha (Q-learning)
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,

    /// Initial exploration rate (Q-learning)
    #[arg(long, default_value_t = 0.1)]
    pub epsilon: f64,

    /// Number of training episodes (Q-learning)
    #[arg(long, default_value_t = 70_000)]
    pub episodes: usize,

    /// Reward for winning
    #[arg(long, default_value_t = 10.0)]
    pub win_reward: f64,

    /// Reward for losing
    #[arg(long, default_value_t = -50.0)]
    pub lose_reward: f64,

    /// Per-step reward for non-terminal continuations
    #[arg(long, default_value_t = -1.0)]
    pub living_reward: f64,

    /// Reward for a draw
    #[arg(long, default_value_t = 0.0)]
    pub draw_reward: f64,

    /// Random seed for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let rewards = Rewards {
        win: args.win_reward,
        lose: args.lose_reward,
        living: args.living_reward,
        draw: args.draw_reward,
    };
    let mdp = TttMdp::with_rewards(rewards);

    let policy = match args.solver {
        Solver::PolicyIteration => {
            let mut config = PolicyIterationConfig::default()
                .with_discount(args.discount)
                .with_delta(args.delta);
            if let Some(seed) = args.seed {
                config = config.with_seed(seed);
            }
            println!("Training with policy iteration (delta {})...", args.delta);
            PolicyIterationAgent::new(mdp, config)
                .with_observer(Box::new(ProgressObserver::new()))
                .train()?
        }
        Solver::ValueIteration => {
            let config = ValueIterationConfig::default()
                .with_discount(args.discount)
                .with_sweeps(args.sweeps);
            println!("Training with value iteration ({} sweeps)...", args.sweeps);
            ValueIterationAgent::new(mdp, config).train()?
        }
        Solver::QLearning => {
            let mut config = QLearningConfig::default()
                .with_learning_rate(args.learning_rate)
                .with_discount(args.discount)
                .with_epsilon(args.epsilon)
                .with_episodes(args.episodes);
            let mut env = TttEnvironment::new(mdp);
            if let Some(seed) = args.seed {
                config = config.with_seed(seed);
                env = env.with_seed(seed.wrapping_add(1));
            }
            println!("Training with Q-learning ({} episodes)...", args.episodes);
            QLearningAgent::new(env, config)
                .with_observer(Box::new(ProgressObserver::new()))
                .train()?
        }
    };

    save_policy(&policy, &args.output)?;
    println!(
        "Saved policy with {} states to {}",
        policy.len(),
        args.output.display()
    );

    Ok(())
}
