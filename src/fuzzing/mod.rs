//! Module for testing using fuzzing (quickcheck)

use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::*;
use quickcheck::Arbitrary;

mod basic;

/// An operation on an allocator. Addresses are given as host offsets within the subnet, where a
/// requested offset of `0` stands for "no preference".
#[derive(Debug, PartialEq, Clone, Copy)]
enum Operation {
    Allocate(u8),
    Reserve(u8),
    Release(u8),
}

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 2000;
const DEFAULT_GEN_SIZE: usize = 100;

fn proptest_runner<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = quickcheck::Gen::new(gen_size);

    // sample all inputs
    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        let input_c = input.clone();
        let success = f(input_c);
        if !success {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug + PartialEq, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for i in input.shrink() {
        let i_c = i.clone();
        let success = f(i_c);
        if !success {
            shrink_failure(f, i)
        }
    }
    // if we reach this point, then all shrunken inputs work. Therefore, `inputs` is the minimal
    // input
    panic!(
        "[QUICKCHECK] Test case failed!\n  Minimal input:\n    {:?}",
        input
    );
}

#[allow(missing_docs)]
#[macro_export]
macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}

impl Arbitrary for Operation {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let host = u8::arbitrary(g);
        match g.choose(&[0, 0, 0, 0, 0, 1, 2, 2, 2, 2]).copied().unwrap_or_default() {
            0 => Self::Allocate(*g.choose(&[0, 0, host]).unwrap_or(&0)),
            1 => Self::Reserve(host),
            _ => Self::Release(host),
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match *self {
            Operation::Allocate(h) => Box::new(h.shrink().map(Operation::Allocate)),
            Operation::Reserve(h) => Box::new(h.shrink().map(Operation::Reserve)),
            Operation::Release(h) => Box::new(h.shrink().map(Operation::Release)),
        }
    }
}

/// Reference implementation of the allocator: a plain ordered set of allocated addresses.
struct Model {
    network: u32,
    broadcast: u32,
    allocated: BTreeSet<u32>,
}

impl Model {
    fn new(pool: &AddressAllocator<(u32, u8)>) -> Self {
        Self {
            network: pool.subnet().network(),
            broadcast: pool.subnet().broadcast(),
            allocated: pool.iter().collect(),
        }
    }

    fn allocate(&mut self, requested: u32) -> Result<u32, Error> {
        let start = requested.max(self.network);
        let addr = (start..=self.broadcast)
            .find(|a| !self.allocated.contains(a))
            .ok_or(Error::Exhausted)?;
        self.allocated.insert(addr);
        Ok(addr)
    }

    fn reserve(&mut self, addr: u32) -> Result<(), Error> {
        if addr < self.network || addr > self.broadcast {
            Err(Error::OutOfSubnet { addr: addr as u64 })
        } else if !self.allocated.insert(addr) {
            Err(Error::AlreadyAllocated { addr: addr as u64 })
        } else {
            Ok(())
        }
    }

    fn release(&mut self, addr: u32) -> Result<(), Error> {
        if addr < self.network || addr > self.broadcast {
            Err(Error::OutOfSubnet { addr: addr as u64 })
        } else if !self.allocated.remove(&addr) {
            Err(Error::NotAllocated { addr: addr as u64 })
        } else {
            Ok(())
        }
    }
}

/// Apply all operations to both the allocator and the model, and check that they agree after
/// every single step.
fn run(pool: &mut AddressAllocator<(u32, u8)>, ops: Vec<Operation>) -> bool {
    let mut model = Model::new(pool);
    let network = model.network;
    let to_addr = |host: u8| network.wrapping_add(host as u32);

    for op in ops {
        let agree = match op {
            Operation::Allocate(0) => pool.allocate(0) == model.allocate(0),
            Operation::Allocate(h) => pool.allocate(to_addr(h)) == model.allocate(to_addr(h)),
            Operation::Reserve(h) => pool.reserve(to_addr(h)) == model.reserve(to_addr(h)),
            Operation::Release(h) => pool.release(to_addr(h)) == model.release(to_addr(h)),
        };
        if !agree {
            return false;
        }
        pool.assert_consistent();
        if pool.len() != model.allocated.len()
            || !pool.iter().eq(model.allocated.iter().copied())
            || pool.count_free() != pool.capacity() - model.allocated.len() as u128
        {
            return false;
        }
    }
    true
}
