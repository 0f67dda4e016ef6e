/*
* Licensed to Elasticsearch B.V. under one or more contributor
* license agreements. See the NOTICE file distributed with
* this work for additional information regarding copyright
* ownership. Elasticsearch B.V. licenses this file to you under
* the Apache License, Version 2.0 (the "License"); you may
* not use this file except in compliance with the License.
* You may obtain a copy of the License at
*
*  http://www.apache.org/licenses/LICENSE-2.0
*
* Unless required by applicable law or agreed to in writing,
* software distributed under the License is distributed on an
* "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
* KIND, either express or implied.  See the License for the
* specific language governing permissions and limitations
* under the License.
*/

use septa::phone::PhoneDirectory;
use septa::{Policy, RaTree, RaTreeBuilder};

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn build_tree(policy: Policy) -> RaTree {
    RaTreeBuilder::new().set_policy(policy).build().unwrap()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut tree = build_tree(Policy::BasicPointer);
    let mut phones = PhoneDirectory::new();

    let leaf_a = tree.leaf_addresses()[3];
    let leaf_b = tree.leaf_addresses()[45];
    let center_a = tree.get_node_and(leaf_a, |n| n.hexagon().center()).unwrap();
    let center_b = tree.get_node_and(leaf_b, |n| n.hexagon().center()).unwrap();

    let a = phones.add("a", center_a).unwrap();
    let b = phones.add("b", center_b).unwrap();
    tree.update_location(&mut phones, a).unwrap();
    tree.update_location(&mut phones, b).unwrap();

    c.bench_function("pointer_search_across_root", |bench| {
        bench.iter(|| tree.call(&mut phones, black_box(a), black_box(b)).unwrap())
    });

    c.bench_function("containing_leaf_full_scan", |bench| {
        bench.iter(|| tree.containing_leaf(black_box(center_b), None).unwrap())
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
