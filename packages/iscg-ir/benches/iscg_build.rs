//! Canonicalization and graph-building benchmarks
//!
//! Synthetic straight-line functions split into blocks, sized like the
//! larger functions of a typical C library.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use iscg_ir::config::PipelineConfig;
use iscg_ir::features::iscg::{IscgUseCase, IscgUseCaseImpl};
use iscg_ir::shared::models::{Block, Function, InstructionRecord, Metadata, Opcode};
use iscg_ir::{process_function, Canonicalizer, FrequencyTables};

const BLOCK_SIZE: usize = 16;

fn synthetic_function(instructions: usize) -> Function {
    let mut function = Function::new("bench");
    function.params = vec!["i32 %0".into(), "ptr %1".into()];

    let mut id = 0u32;
    let mut prev = "%0".to_string();
    let blocks = instructions.div_ceil(BLOCK_SIZE).max(1);
    for b in 0..blocks {
        let mut block = Block::new(format!("{}:", 1000 + b));
        for i in 0..BLOCK_SIZE.min(instructions - b * BLOCK_SIZE).saturating_sub(1) {
            let var = format!("%v{id}");
            let text = format!("{var} = add nsw i32 {prev}, {}", 4096 + i);
            let mut record = InstructionRecord::new(id, Opcode::parse("add"), text);
            record.operands = vec![format!("i32 {prev}"), format!("i32 {}", 4096 + i)];
            record.defined_var = Some(var.clone());
            block.instructions.push(record);
            prev = var;
            id += 1;
        }

        let terminator = if b + 1 < blocks {
            let target = format!("%{}", 1000 + b + 1);
            let mut br = InstructionRecord::new(id, Opcode::Br, format!("br label {target}"));
            br.targets = vec![format!("label {target}")];
            br
        } else {
            let mut ret = InstructionRecord::new(id, Opcode::Ret, format!("ret i32 {prev}"));
            ret.return_value = Some(format!("i32 {prev}"));
            ret
        };
        block.instructions.push(terminator);
        id += 1;
        function.blocks.push(block);
    }
    function
}

fn bench_canonicalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("canonicalize");
    let metadata = Metadata::default();
    let frequency = FrequencyTables::empty();
    let config = PipelineConfig::default();

    for size in [64, 512, 4096] {
        let function = synthetic_function(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &function, |b, f| {
            let canonicalizer = Canonicalizer::new(&metadata, &frequency, &config.canonicalize);
            b.iter(|| black_box(canonicalizer.canonicalize(f)))
        });
    }
    group.finish();
}

fn bench_build_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_iscg");
    let metadata = Metadata::default();
    let frequency = FrequencyTables::empty();
    let config = PipelineConfig::default();
    let usecase = IscgUseCaseImpl::from_pipeline(&config);

    for size in [64, 512, 4096] {
        let canonical = Canonicalizer::new(&metadata, &frequency, &config.canonicalize)
            .canonicalize(&synthetic_function(size));
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &canonical, |b, c| {
            b.iter(|| black_box(usecase.build_iscg(c, &metadata)))
        });
    }
    group.finish();
}

fn bench_process_function(c: &mut Criterion) {
    let metadata = Metadata::default();
    let frequency = FrequencyTables::empty();
    let config = PipelineConfig::default();
    let function = synthetic_function(512);

    c.bench_function("process_function/512", |b| {
        b.iter(|| black_box(process_function(&function, &metadata, &frequency, &config)))
    });
}

criterion_group!(
    benches,
    bench_canonicalize,
    bench_build_graph,
    bench_process_function
);
criterion_main!(benches);
