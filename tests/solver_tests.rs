//! Cross-checks between the dynamic-programming solvers and known-good
//! play in hand-picked positions.

use ttt_mdp::{
    BoardState, Player, Rewards, TttMdp,
    agents::{
        PolicyIterationAgent, PolicyIterationConfig, ValueIterationAgent, ValueIterationConfig,
    },
    tictactoe::generate_all_states,
};

#[test]
fn transition_probabilities_sum_to_one_everywhere() {
    let mdp = TttMdp::new();

    for state in generate_all_states(Player::X) {
        for action in state.possible_actions() {
            let transitions = mdp.generate_transitions(&state, &action).unwrap();
            assert!(!transitions.is_empty());

            let total: f64 = transitions.iter().map(|t| t.probability).sum();
            assert!(
                (total - 1.0).abs() < 1e-9,
                "probabilities sum to {total} from {} playing {}",
                state.encode(),
                action.position
            );
        }
    }
}

#[test]
fn policy_evaluation_changes_never_increase() {
    let mut agent = PolicyIterationAgent::new(
        TttMdp::new(),
        PolicyIterationConfig::default().with_seed(13),
    );

    let changes = agent.evaluate_policy(1e-6).unwrap();
    assert!(changes.len() > 1);
    for pair in changes.windows(2) {
        assert!(
            pair[1] <= pair[0] + 1e-9,
            "sweep change grew from {} to {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn policy_iteration_finds_the_winning_move() {
    let mut agent = PolicyIterationAgent::new(
        TttMdp::new(),
        PolicyIterationConfig::default().with_seed(11),
    );
    let policy = agent.train().unwrap();

    // Top row is one move from completion.
    let state = BoardState::from_label("XX.OO...._X").unwrap();
    assert_eq!(policy.get_move(&state).unwrap().position, 2);

    let opening = policy.get_move(&BoardState::new()).unwrap();
    assert!([0, 2, 4, 6, 8].contains(&opening.position));
}

#[test]
fn policy_iteration_blocks_the_losing_reply() {
    let mut agent = PolicyIterationAgent::new(
        TttMdp::new(),
        PolicyIterationConfig::default().with_seed(11),
    );
    let policy = agent.train().unwrap();

    // O threatens the middle row; 5 is the only move that does not lose
    // to some opponent reply.
    let state = BoardState::from_label("X..OO...X_X").unwrap();
    assert_eq!(policy.get_move(&state).unwrap().position, 5);
}

#[test]
fn value_iteration_finds_the_winning_move() {
    let mut agent =
        ValueIterationAgent::new(TttMdp::new(), ValueIterationConfig::default().with_sweeps(50));
    let policy = agent.train().unwrap();

    let state = BoardState::from_label("XX.OO...._X").unwrap();
    assert_eq!(policy.get_move(&state).unwrap().position, 2);

    let state = BoardState::from_label("X..OO...X_X").unwrap();
    assert_eq!(policy.get_move(&state).unwrap().position, 5);
}

#[test]
fn opening_move_is_center_or_corner() {
    let mut agent =
        ValueIterationAgent::new(TttMdp::new(), ValueIterationConfig::default().with_sweeps(50));
    let policy = agent.train().unwrap();

    let opening = policy.get_move(&BoardState::new()).unwrap();
    assert!(
        [0, 2, 4, 6, 8].contains(&opening.position),
        "opening move was {}",
        opening.position
    );
}

#[test]
fn immediate_win_is_worth_exactly_the_win_reward() {
    let rewards = Rewards {
        win: 10.0,
        lose: -10.0,
        living: -1.0,
        draw: 0.0,
    };
    let mut agent = ValueIterationAgent::new(
        TttMdp::with_rewards(rewards),
        ValueIterationConfig::default().with_sweeps(50),
    );
    agent.iterate().unwrap();

    // A winning move ends the episode, so its one-step return is the win
    // reward with nothing discounted behind it.
    let state = BoardState::from_label("XX.OO...._X").unwrap();
    let winning = state
        .possible_actions()
        .into_iter()
        .find(|a| a.position == 2)
        .unwrap();

    let value = agent.action_value(&state, &winning).unwrap();
    assert!((value - 10.0).abs() < 1e-9);
}

#[test]
fn solvers_agree_on_values_and_clear_cut_actions() {
    let mut vi =
        ValueIterationAgent::new(TttMdp::new(), ValueIterationConfig::default().with_sweeps(200));
    vi.iterate().unwrap();
    let vi_policy = vi.extract_policy().unwrap();

    let mut pi = PolicyIterationAgent::new(
        TttMdp::new(),
        PolicyIterationConfig::default().with_delta(1e-6).with_seed(5),
    );
    let pi_policy = pi.train().unwrap();

    for state in generate_all_states(Player::X) {
        if state.is_terminal() {
            continue;
        }

        let vi_value = vi.value(&state).unwrap();
        let pi_value = pi.value(&state).unwrap();
        assert!(
            (vi_value - pi_value).abs() < 1e-2,
            "values diverge at {}: vi={vi_value} pi={pi_value}",
            state.encode()
        );

        // Where the best action wins by a clear margin the two greedy
        // policies must pick the same move; exact ties may break either way.
        let mut action_values: Vec<f64> = state
            .possible_actions()
            .iter()
            .map(|a| vi.action_value(&state, a).unwrap())
            .collect();
        action_values.sort_by(|a, b| b.partial_cmp(a).unwrap());
        let clear_cut =
            action_values.len() < 2 || action_values[0] - action_values[1] > 1e-3;

        if clear_cut {
            assert_eq!(
                vi_policy.get_move(&state).unwrap().position,
                pi_policy.get_move(&state).unwrap().position,
                "policies diverge at {}",
                state.encode()
            );
        }
    }
}
