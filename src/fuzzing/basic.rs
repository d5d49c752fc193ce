use super::*;

qc!(slash_24, _slash_24);
fn _slash_24(ops: Vec<Operation>) -> bool {
    let mut pool = AddressAllocator::new((0x0a000000u32, 24)).unwrap();
    run(&mut pool, ops)
}

qc!(slash_24_no_reservations, _slash_24_no_reservations);
fn _slash_24_no_reservations(ops: Vec<Operation>) -> bool {
    let mut pool =
        AddressAllocator::with_reservations((0xc0a80100u32, 24), Reservations::none()).unwrap();
    run(&mut pool, ops)
}

qc!(tiny_subnets, _tiny_subnets);
fn _tiny_subnets((len, ops): (u8, Vec<Operation>)) -> bool {
    // between 0 and 5 host bits, so that the subnet runs full all the time.
    let len = 27 + len % 6;
    let mut pool =
        AddressAllocator::with_reservations((0xac100020u32, len), Reservations::none()).unwrap();
    run(&mut pool, ops)
}

qc!(top_of_address_space, _top_of_address_space);
fn _top_of_address_space(ops: Vec<Operation>) -> bool {
    let mut pool = AddressAllocator::new((0xffffff00u32, 24)).unwrap();
    run(&mut pool, ops)
}

qc!(clear_restores_construction, _clear_restores_construction);
fn _clear_restores_construction(ops: Vec<Operation>) -> bool {
    let mut pool = AddressAllocator::new((0x0a000000u32, 26)).unwrap();
    let fresh = pool.iter().collect::<Vec<_>>();
    let live = pool.table.live();
    if !run(&mut pool, ops) {
        return false;
    }
    pool.clear().unwrap();
    pool.assert_consistent();
    pool.iter().eq(fresh) && pool.table.live() == live
}
