use crystalmatch::{linear_sum_assignment, Assignment};

const ASSIGNMENT_SIZE: usize = 64;
const N: usize = 100;

fn main() {
    let mut assignment = Assignment::default();
    let mut total_cost = 0.;
    for _ in 0..N {
        let costs = nalgebra::DMatrix::<f64>::new_random(ASSIGNMENT_SIZE, ASSIGNMENT_SIZE);
        linear_sum_assignment(&costs, &mut assignment).expect("random costs are feasible");
        total_cost += assignment.total_cost(&costs);
    }

    println!("total: {total_cost}");
}
