// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end coverage of the full pipeline (registry -> mapping ->
//! program -> compiled codec -> bytes) against the literal scenarios and
//! testable properties of the design this crate implements.

use std::any::Any;

use bitwire::mapping::{Activator, ObjectMapping};
use bitwire::{Registry, SchemaError};

#[derive(Debug, Clone, PartialEq, Default)]
struct TwoInts {
	x: i32,
	y: i32,
}

fn two_ints_mapping() -> ObjectMapping<TwoInts> {
	ObjectMapping::new("TwoInts", Activator::default_ctor(TwoInts::default))
		.value("x", |v: &TwoInts| &v.x, |v: &mut TwoInts, val| v.x = val)
		.value("y", |v: &TwoInts| &v.y, |v: &mut TwoInts, val| v.y = val)
}

#[test]
fn two_ints_round_trip_through_registry() {
	let registry = Registry::new();
	registry.register(two_ints_mapping()).unwrap();

	let value = TwoInts { x: 1500, y: 37_500 };
	let mut buf = vec![0u8; registry.size_from_value(&value).unwrap() as usize];
	registry.serialize(&value, &mut buf, 0).unwrap();

	// Struct header: ContentLength, SerializationTypeId, no null mask (no
	// nullable members), then x, y in declared order.
	assert_eq!(buf.len(), 12);
	assert_eq!(&buf[4..8], [0xDC, 0x05, 0x00, 0x00]);
	assert_eq!(&buf[8..12], [0x9C, 0x92, 0x00, 0x00]);

	let decoded: TwoInts = registry.deserialize(&buf, 0).unwrap();
	assert_eq!(decoded, value);
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Mixed {
	x: Option<i32>,
	y: Option<i32>,
	i: i32,
	j: i32,
}

fn mixed_mapping() -> ObjectMapping<Mixed> {
	ObjectMapping::new("Mixed", Activator::default_ctor(Mixed::default))
		.nullable_value("x", |v: &Mixed| v.x.as_ref(), |v: &mut Mixed, val| v.x = val)
		.nullable_value("y", |v: &Mixed| v.y.as_ref(), |v: &mut Mixed, val| v.y = val)
		.value("i", |v: &Mixed| &v.i, |v: &mut Mixed, val| v.i = val)
		.value("j", |v: &Mixed| &v.j, |v: &mut Mixed, val| v.j = val)
}

#[test]
fn s2_nullable_fields_block_with_mixed_presence() {
	let registry = Registry::new();
	registry.register(mixed_mapping()).unwrap();

	let value = Mixed {
		x: None,
		y: None,
		i: 200,
		j: 300,
	};
	let size = registry.size_from_value(&value).unwrap();
	let mut buf = vec![0u8; size as usize];
	registry.serialize(&value, &mut buf, 0).unwrap();

	// Struct header (4 bytes) + 1-byte null mask (bits 0 and 1 set =
	// 0b1100_0000) + I + J, per S2.
	assert_eq!(size, 13);
	assert_eq!(buf[4], 0b1100_0000);
	assert_eq!(&buf[5..9], [0xC8, 0x00, 0x00, 0x00]);
	assert_eq!(&buf[9..13], [0x2C, 0x01, 0x00, 0x00]);

	let decoded: Mixed = registry.deserialize(&buf, 0).unwrap();
	assert_eq!(decoded, value);

	// Property 2: size-from-buffer agrees with size-from-value.
	assert_eq!(registry.size_from_buffer::<Mixed>(&buf, 0), size);
}

#[test]
fn mixed_fields_all_present_round_trip() {
	let registry = Registry::new();
	registry.register(mixed_mapping()).unwrap();

	let value = Mixed {
		x: Some(7),
		y: Some(-3),
		i: 1,
		j: 2,
	};
	let size = registry.size_from_value(&value).unwrap();
	let mut buf = vec![0u8; size as usize];
	registry.serialize(&value, &mut buf, 0).unwrap();

	assert_eq!(buf[4], 0b0000_0000);
	assert_eq!(size, 21); // header(4) + mask(1) + x(4) + y(4) + i(4) + j(4)

	let decoded: Mixed = registry.deserialize(&buf, 0).unwrap();
	assert_eq!(decoded, value);
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Strings {
	s1: String,
	s2: Option<String>,
	s3: String,
	i: i32,
	j: i32,
}

fn strings_mapping() -> ObjectMapping<Strings> {
	ObjectMapping::new("Strings", Activator::default_ctor(Strings::default))
		.value("s1", |v: &Strings| &v.s1, |v: &mut Strings, val| v.s1 = val)
		.nullable_value("s2", |v: &Strings| v.s2.as_ref(), |v: &mut Strings, val| v.s2 = val)
		.value("s3", |v: &Strings| &v.s3, |v: &mut Strings, val| v.s3 = val)
		.value("i", |v: &Strings| &v.i, |v: &mut Strings, val| v.i = val)
		.value("j", |v: &Strings| &v.j, |v: &mut Strings, val| v.j = val)
}

#[test]
fn s3_non_value_type_fields_with_a_null_reference() {
	let registry = Registry::new();
	registry.register(strings_mapping()).unwrap();

	let value = Strings {
		s1: "Hello fucking world".to_string(),
		s2: None,
		s3: "Hello again".to_string(),
		i: 1993,
		j: 200,
	};
	let size = registry.size_from_value(&value).unwrap();
	let mut buf = vec![0u8; size as usize];
	registry.serialize(&value, &mut buf, 0).unwrap();

	// Null mask is 1 byte with bit 1 set (s2 is the second nullable
	// member, and is absent): 0b0100_0000.
	assert_eq!(buf[4], 0b0100_0000);

	let decoded: Strings = registry.deserialize(&buf, 0).unwrap();
	assert_eq!(decoded, value);
	assert_eq!(registry.size_from_buffer::<Strings>(&buf, 0), size);
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Pair {
	a: i32,
	b: i32,
}

fn pair_mapping() -> ObjectMapping<Pair> {
	ObjectMapping::new("Pair", Activator::default_ctor(Pair::default))
		.value("a", |v: &Pair| &v.a, |v: &mut Pair, val| v.a = val)
		.value("b", |v: &Pair| &v.b, |v: &mut Pair, val| v.b = val)
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Holder {
	items: Vec<Option<Pair>>,
}

fn holder_mapping() -> ObjectMapping<Holder> {
	ObjectMapping::new("Holder", Activator::default_ctor(Holder::default)).sparse_struct_array_value(
		"items",
		|v: &Holder| &v.items,
		|v: &mut Holder, val| v.items = val,
	)
}

#[test]
fn s4_sparse_array_of_structs() {
	let registry = Registry::new();
	// Pair must be registered before Holder references it (§4.3 cycle
	// handling).
	registry.register(pair_mapping()).unwrap();
	registry.register(holder_mapping()).unwrap();

	let value = Holder {
		items: vec![
			None,
			Some(Pair { a: 10, b: 20 }),
			None,
			None,
			Some(Pair { a: 30, b: 40 }),
			None,
			Some(Pair { a: 50, b: 60 }),
		],
	};
	let size = registry.size_from_value(&value).unwrap();
	let mut buf = vec![0u8; size as usize];
	registry.serialize(&value, &mut buf, 0).unwrap();

	// Holder has no nullable members of its own, so its header is just
	// ContentLength + SerializationTypeId (4 bytes), immediately followed
	// by the `items` collection's own wire block.
	let collection_off = 4;
	assert_eq!(
		u16::from_le_bytes([buf[collection_off + 2], buf[collection_off + 3]]),
		7
	); // CollectionLength
	assert_eq!(buf[collection_off + 4], 0x01); // TypeData: sparse

	// Nested BitField null mask: its own 2-byte ContentLength (1 mask
	// byte + 2), then the mask byte itself, matching S4's literal pattern.
	let mask_off = collection_off + 5;
	assert_eq!(u16::from_le_bytes([buf[mask_off], buf[mask_off + 1]]), 3);
	assert_eq!(buf[mask_off + 2], 0b1011_0100);

	let decoded: Holder = registry.deserialize(&buf, 0).unwrap();
	assert_eq!(decoded, value);
	assert_eq!(registry.size_from_buffer::<Holder>(&buf, 0), size);
}

#[test]
fn s6_empty_sparse_array_of_structs() {
	let registry = Registry::new();
	registry.register(pair_mapping()).unwrap();
	registry.register(holder_mapping()).unwrap();

	let value = Holder { items: Vec::new() };
	let size = registry.size_from_value(&value).unwrap();
	let mut buf = vec![0u8; size as usize];
	registry.serialize(&value, &mut buf, 0).unwrap();

	// Holder header (4) + collection header only: ContentLength=5,
	// CollectionLength=0, TypeData=0x00 (empty collections are never
	// sparse).
	assert_eq!(&buf[4..9], [5, 0, 0, 0, 0]);

	let decoded: Holder = registry.deserialize(&buf, 0).unwrap();
	assert_eq!(decoded, value);
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Alpha {
	x: i32,
}

fn alpha_mapping() -> ObjectMapping<Alpha> {
	ObjectMapping::new("Alpha", Activator::default_ctor(Alpha::default))
		.value("x", |v: &Alpha| &v.x, |v: &mut Alpha, val| v.x = val)
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Beta {
	y: i32,
}

fn beta_mapping() -> ObjectMapping<Beta> {
	ObjectMapping::new("Beta", Activator::default_ctor(Beta::default))
		.value("y", |v: &Beta| &v.y, |v: &mut Beta, val| v.y = val)
}

#[test]
fn property_6_type_id_routing_disambiguates_disjoint_types() {
	let registry = Registry::new();
	registry.register(alpha_mapping()).unwrap();
	registry.register(beta_mapping()).unwrap();

	let a = Alpha { x: 42 };
	let mut buf = vec![0u8; 32];
	registry.serialize_dyn(&a as &dyn Any, &mut buf, 0).unwrap();

	let decoded = registry.deserialize_dyn(&buf, 0).unwrap();
	let decoded_a = decoded.downcast::<Alpha>().expect("should route back to Alpha, not Beta");
	assert_eq!(*decoded_a, a);
}

struct Wrapper {
	inner: Box<dyn Any>,
}

impl Default for Wrapper {
	fn default() -> Self {
		Self {
			inner: Box::new(Alpha::default()),
		}
	}
}

fn wrapper_mapping() -> ObjectMapping<Wrapper> {
	ObjectMapping::new("Wrapper", Activator::default_ctor(Wrapper::default)).polymorphic_value(
		"inner",
		|v: &Wrapper| &v.inner,
		|v: &mut Wrapper, val| v.inner = val,
	)
}

#[test]
fn polymorphic_field_round_trips_each_registered_variant() {
	let registry = Registry::new();
	registry.register(alpha_mapping()).unwrap();
	registry.register(beta_mapping()).unwrap();
	registry.register(wrapper_mapping()).unwrap();

	let holding_beta = Wrapper {
		inner: Box::new(Beta { y: 99 }),
	};
	let size = registry.size_from_value(&holding_beta).unwrap();
	let mut buf = vec![0u8; size as usize];
	registry.serialize(&holding_beta, &mut buf, 0).unwrap();

	let decoded: Wrapper = registry.deserialize(&buf, 0).unwrap();
	let decoded_beta = decoded.inner.downcast_ref::<Beta>().expect("should decode as Beta");
	assert_eq!(*decoded_beta, Beta { y: 99 });
}

#[test]
fn registering_the_same_type_twice_fails() {
	let registry = Registry::new();
	registry.register(two_ints_mapping()).unwrap();

	let err = registry.register(two_ints_mapping()).unwrap_err();
	assert!(matches!(err, SchemaError::AlreadyRegistered { .. }));
}

#[test]
fn struct_field_referencing_an_unregistered_type_fails() {
	let registry = Registry::new();
	// `Holder` names `Pair` before `Pair` has been registered.
	let err = registry.register(holder_mapping()).unwrap_err();
	assert!(matches!(err, SchemaError::NoCodecForType { .. }));
}

#[test]
fn property_7_endianness() {
	let registry = Registry::new();
	registry.register(two_ints_mapping()).unwrap();

	let value = TwoInts { x: 0x0102, y: 0 };
	let mut buf = vec![0u8; registry.size_from_value(&value).unwrap() as usize];
	registry.serialize(&value, &mut buf, 0).unwrap();
	assert_eq!(&buf[4..6], [0x02, 0x01]);
}

#[derive(Debug, Clone, PartialEq)]
struct Immutable {
	id: i32,
	label: String,
}

fn immutable_mapping() -> ObjectMapping<Immutable> {
	ObjectMapping::new(
		"Immutable",
		Activator::parameterized().param("id", |v: &Immutable| &v.id).build(|mut params| {
			let id = params.remove(0).ok_or_else(|| "id missing".to_string())?;
			let id = *id.downcast::<i32>().map_err(|_| "id type mismatch".to_string())?;
			Ok(Immutable { id, label: String::new() })
		}),
	)
	.value(
		"label",
		|v: &Immutable| &v.label,
		|v: &mut Immutable, val| v.label = val,
	)
}

#[test]
fn parameterized_activator_round_trips() {
	let registry = Registry::new();
	registry.register(immutable_mapping()).unwrap();

	let value = Immutable {
		id: 7,
		label: "hi".to_string(),
	};
	let size = registry.size_from_value(&value).unwrap();
	let mut buf = vec![0u8; size as usize];
	registry.serialize(&value, &mut buf, 0).unwrap();

	let decoded: Immutable = registry.deserialize(&buf, 0).unwrap();
	assert_eq!(decoded, value);
}

#[test]
fn property_3_length_honesty() {
	let registry = Registry::new();
	registry.register(mixed_mapping()).unwrap();

	let value = Mixed {
		x: Some(1),
		y: None,
		i: 2,
		j: 3,
	};
	let declared_size = registry.size_from_value(&value).unwrap();
	let mut buf = vec![0xAAu8; declared_size as usize + 8];
	registry.serialize(&value, &mut buf, 0).unwrap();

	// Bytes past the declared size must be untouched by serialize.
	assert!(buf[declared_size as usize..].iter().all(|&b| b == 0xAA));
}
