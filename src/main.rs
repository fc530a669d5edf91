use std::{
    env, fs,
    io::{self, BufWriter, Write},
};

use anyhow::{Context, bail};
use log::info;

use specs::ProblemSpec;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let [_, path] = args.as_slice() else {
        let bin = args.first().map_or("polydisperse-iq", String::as_str);
        bail!("usage: {bin} <problem.json>");
    };

    let text = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let spec = ProblemSpec::from_json(&text).with_context(|| format!("parsing {path}"))?;
    info!("loaded {path}: model {}", spec.model);

    let intensity = driver::compute(&spec).context("computing I(q)")?;
    let plane = spec.q.is_plane();
    let stride = if plane { 2 } else { 1 };

    let mut out = BufWriter::new(io::stdout().lock());
    for (q, iq) in intensity.q.chunks(stride).zip(&intensity.iq) {
        if plane {
            writeln!(out, "{:.6e} {:.6e} {iq:.6e}", q[0], q[1])?;
        } else {
            writeln!(out, "{:.6e} {iq:.6e}", q[0])?;
        }
    }
    out.flush()?;

    info!("norm {:.6e}", intensity.norm);
    Ok(())
}
