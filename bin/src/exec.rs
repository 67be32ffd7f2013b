use std::str::FromStr;

use arith::BN254Fr;
use bin::executor::*;
use clap::Parser;
use goldilocks::Goldilocks;
use mersenne31::M31;

fn main() {
    env_logger::init();
    let vec_ops_exec_args = VecOpsExecArgs::parse();

    let field = FieldKind::from_str(&vec_ops_exec_args.field).unwrap();
    log::info!("field type: {field}, args: {vec_ops_exec_args:?}");

    let result = match field {
        FieldKind::M31 => run_command::<M31>(&vec_ops_exec_args),
        FieldKind::Goldilocks => run_command::<Goldilocks>(&vec_ops_exec_args),
        FieldKind::BN254 => run_command::<BN254Fr>(&vec_ops_exec_args),
    };
    exit_on_failure(field, result);
}
