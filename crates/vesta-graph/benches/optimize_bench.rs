use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use vesta_core::device::{ProgramHandle, TextureHandle, VertexArrayHandle};
use vesta_core::RenderSettings;
use vesta_graph::operation::{BindTexture, DrawMesh, MeshSource, ShaderInput, TextureSource};
use vesta_graph::optimizer::FramePlan;
use vesta_graph::{
    FrameBufferStage, NodePass, OperationList, Optimizer, PassGraph, PassRef, RenderManager,
    ShaderProgramPass, SimpleOptimizer, StateSortingOptimizer,
};
use vesta_infra::RecordingDevice;

/// 8 stages of 16 program passes (cycling through 4 programs) of 16 nodes.
fn populate(graph: &mut PassGraph) {
    for s in 0..8 {
        let stage = graph.add_stage(FrameBufferStage::new(format!("stage-{s}")));
        for p in 0..16u32 {
            let program = ProgramHandle(p % 4 + 1);
            let pass = graph
                .add_program_pass(stage, ShaderProgramPass::new(format!("pass-{s}-{p}")))
                .unwrap();
            graph.set_program(pass, program).unwrap();
            for n in 0..16u32 {
                let node = graph
                    .add_node_pass(pass, NodePass::new(format!("node-{n}")))
                    .unwrap();
                graph
                    .push_operation(
                        PassRef::Node(node),
                        OperationList::Operations,
                        BindTexture::new(
                            Some(TextureSource::new(TextureHandle(n % 3 + 1))),
                            Some(ShaderInput::new(program, 0, 0)),
                        ),
                    )
                    .unwrap();
                graph
                    .push_operation(
                        PassRef::Node(node),
                        OperationList::Operations,
                        DrawMesh::new(Some(MeshSource::indexed(VertexArrayHandle(n + 1), 36))),
                    )
                    .unwrap();
            }
        }
    }
}

fn bench_optimizers(c: &mut Criterion) {
    let mut graph = PassGraph::new();
    populate(&mut graph);
    let previous = FramePlan::default();

    let mut group = c.benchmark_group("Optimize");

    group.bench_function("Simple", |b| {
        b.iter(|| black_box(SimpleOptimizer.optimize(&graph, &previous)));
    });

    group.bench_function("StateSorting", |b| {
        let optimizer = StateSortingOptimizer::default();
        b.iter(|| black_box(optimizer.optimize(&graph, &previous)));
    });

    group.finish();
}

fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("Render Frame");

    for (name, kind) in [
        ("Simple replay", vesta_core::OptimizerKind::Simple),
        ("StateSorting replay", vesta_core::OptimizerKind::StateSorting),
    ] {
        let settings = RenderSettings {
            optimizer: kind,
            ..RenderSettings::default()
        };
        let device = RecordingDevice::new();
        let mut manager = RenderManager::new(Box::new(device.clone()), settings);
        populate(manager.graph_mut());

        group.bench_function(name, |b| {
            b.iter(|| {
                black_box(manager.render_frame().device_calls_issued);
                device.clear();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_optimizers, bench_frames);
criterion_main!(benches);
