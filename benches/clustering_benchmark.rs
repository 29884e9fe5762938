use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array2;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use std::time::Duration;
use unsupervised_rs::{
    pca_imputation, ClusterCount, FirstImputation, ImputationConfig, InitMethod, KMeans,
    KMeansConfig, Pca, Wards,
};

fn benchmark_kmeans_init(c: &mut Criterion) {
    let mut group = c.benchmark_group("kmeans_init");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let n_samples = 2_000;
    let n_features = 16;
    let k = 20;
    let data = Array2::random((n_samples, n_features), Uniform::new(-1.0, 1.0));

    for init in [InitMethod::Standard, InitMethod::Plus] {
        group.throughput(Throughput::Elements(n_samples as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{:?}", init)),
            &init,
            |b, &init| {
                let config = KMeansConfig::new(k)
                    .with_init(init)
                    .with_max_iters(10_000)
                    .with_seed(42);

                b.iter(|| {
                    let mut kmeans = KMeans::with_config(config.clone()).unwrap();
                    kmeans.fit(black_box(&data.view())).unwrap();
                    kmeans
                });
            },
        );
    }
    group.finish();
}

fn benchmark_wards_varying_samples(c: &mut Criterion) {
    let mut group = c.benchmark_group("wards_samples");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let n_features = 8;
    let sample_sizes = [50, 100, 200];

    for n_samples in sample_sizes.iter() {
        group.throughput(Throughput::Elements(*n_samples as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(n_samples),
            n_samples,
            |b, &n_samples| {
                let data = Array2::random((n_samples, n_features), Uniform::new(-1.0, 1.0));

                b.iter(|| {
                    let mut wards = Wards::new(ClusterCount::Fixed(4)).unwrap();
                    wards.fit(black_box(&data.view())).unwrap();
                    wards
                });
            },
        );
    }
    group.finish();
}

fn benchmark_pca_varying_dimensions(c: &mut Criterion) {
    let mut group = c.benchmark_group("pca_dimensions");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(2));

    let n_samples = 2_000;
    let dimensions = [8, 32, 128];

    for n_features in dimensions.iter() {
        group.throughput(Throughput::Elements(*n_features as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(n_features),
            n_features,
            |b, &n_features| {
                let data = Array2::random((n_samples, n_features), Uniform::new(-1.0, 1.0));

                b.iter(|| {
                    let mut pca = Pca::new(4).unwrap();
                    pca.fit(black_box(&data.view())).unwrap();
                    pca.reconstruct().unwrap()
                });
            },
        );
    }
    group.finish();
}

fn benchmark_imputation(c: &mut Criterion) {
    let mut group = c.benchmark_group("pca_imputation");
    group.sample_size(10);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(3));

    let scores = Array2::random((500, 3), Uniform::new(-1.0, 1.0));
    let loadings = Array2::random((3, 10), Uniform::new(-1.0, 1.0));
    let mut data = scores.dot(&loadings);
    for i in (0..500).step_by(7) {
        data[[i, i % 10]] = f64::NAN;
    }

    let single = ImputationConfig::new(3)
        .with_first_imputation(FirstImputation::Mean)
        .with_max_iters(100_000);
    let multiple = single.clone().with_multiple(5);

    for (name, config) in [("single", single), ("multiple", multiple)] {
        group.bench_function(name, |b| {
            b.iter(|| pca_imputation(black_box(&data.view()), &config).unwrap());
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    benchmark_kmeans_init,
    benchmark_wards_varying_samples,
    benchmark_pca_varying_dimensions,
    benchmark_imputation,
);

criterion_main!(benches);
