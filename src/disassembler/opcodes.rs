//! The static opcode catalog.
//!
//! Opcodes are dense small integers indexing directly into [`OPCODES`]. Each entry pairs
//! the mnemonic with a decode class describing how many operand cells follow the opcode
//! cell and how the operands are rendered. Reserved slots keep an empty mnemonic so the
//! table stays value-indexed; [`lookup`] treats them the same as out-of-range values.

/// How an instruction's operands are decoded and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpcodeKind {
    /// A fixed number of plain operand cells, printed as hex.
    Parm(u8),
    /// Function prologue; annotated with the name of the function starting here.
    Proc,
    /// One code-address operand, annotated with the callee's name.
    Call,
    /// One code-address operand (branches and `switch`).
    Jump,
    /// One operand holding a native-table ordinal, annotated with the native's name.
    SysReq,
    /// A case table: a count cell, a default address, then `count` value/address pairs.
    CaseTbl,
}

/// A single catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    pub mnemonic: &'static str,
    pub kind: OpcodeKind,
}

const fn op(mnemonic: &'static str, kind: OpcodeKind) -> Opcode {
    Opcode { mnemonic, kind }
}

const RESERVED: Opcode = op("", OpcodeKind::Parm(0));

/// The full value-indexed opcode catalog.
pub static OPCODES: [Opcode; 158] = [
    RESERVED,                                   //   0
    op("load.pri", OpcodeKind::Parm(1)),        //   1
    op("load.alt", OpcodeKind::Parm(1)),        //   2
    op("load.s.pri", OpcodeKind::Parm(1)),      //   3
    op("load.s.alt", OpcodeKind::Parm(1)),      //   4
    op("lref.pri", OpcodeKind::Parm(1)),        //   5
    op("lref.alt", OpcodeKind::Parm(1)),        //   6
    op("lref.s.pri", OpcodeKind::Parm(1)),      //   7
    op("lref.s.alt", OpcodeKind::Parm(1)),      //   8
    op("load.i", OpcodeKind::Parm(0)),          //   9
    op("lodb.i", OpcodeKind::Parm(1)),          //  10
    op("const.pri", OpcodeKind::Parm(1)),       //  11
    op("const.alt", OpcodeKind::Parm(1)),       //  12
    op("addr.pri", OpcodeKind::Parm(1)),        //  13
    op("addr.alt", OpcodeKind::Parm(1)),        //  14
    op("stor.pri", OpcodeKind::Parm(1)),        //  15
    op("stor.alt", OpcodeKind::Parm(1)),        //  16
    op("stor.s.pri", OpcodeKind::Parm(1)),      //  17
    op("stor.s.alt", OpcodeKind::Parm(1)),      //  18
    op("sref.pri", OpcodeKind::Parm(1)),        //  19
    op("sref.alt", OpcodeKind::Parm(1)),        //  20
    op("sref.s.pri", OpcodeKind::Parm(1)),      //  21
    op("sref.s.alt", OpcodeKind::Parm(1)),      //  22
    op("stor.i", OpcodeKind::Parm(0)),          //  23
    op("strb.i", OpcodeKind::Parm(1)),          //  24
    op("lidx", OpcodeKind::Parm(0)),            //  25
    op("lidx.b", OpcodeKind::Parm(1)),          //  26
    op("idxaddr", OpcodeKind::Parm(0)),         //  27
    op("idxaddr.b", OpcodeKind::Parm(1)),       //  28
    op("align.pri", OpcodeKind::Parm(1)),       //  29
    op("align.alt", OpcodeKind::Parm(1)),       //  30
    op("lctrl", OpcodeKind::Parm(1)),           //  31
    op("sctrl", OpcodeKind::Parm(1)),           //  32
    op("move.pri", OpcodeKind::Parm(0)),        //  33
    op("move.alt", OpcodeKind::Parm(0)),        //  34
    op("xchg", OpcodeKind::Parm(0)),            //  35
    op("push.pri", OpcodeKind::Parm(0)),        //  36
    op("push.alt", OpcodeKind::Parm(0)),        //  37
    op("push.r", OpcodeKind::Parm(1)),          //  38 (obsolete, never generated)
    op("push.c", OpcodeKind::Parm(1)),          //  39
    op("push", OpcodeKind::Parm(1)),            //  40
    op("push.s", OpcodeKind::Parm(1)),          //  41
    op("pop.pri", OpcodeKind::Parm(0)),         //  42
    op("pop.alt", OpcodeKind::Parm(0)),         //  43
    op("stack", OpcodeKind::Parm(1)),           //  44
    op("heap", OpcodeKind::Parm(1)),            //  45
    op("proc", OpcodeKind::Proc),               //  46
    op("ret", OpcodeKind::Parm(0)),             //  47
    op("retn", OpcodeKind::Parm(0)),            //  48
    op("call", OpcodeKind::Call),               //  49
    op("call.pri", OpcodeKind::Parm(0)),        //  50
    op("jump", OpcodeKind::Jump),               //  51
    op("jrel", OpcodeKind::Parm(1)),            //  52 (same as jump since version 10)
    op("jzer", OpcodeKind::Jump),               //  53
    op("jnz", OpcodeKind::Jump),                //  54
    op("jeq", OpcodeKind::Jump),                //  55
    op("jneq", OpcodeKind::Jump),               //  56
    op("jless", OpcodeKind::Jump),              //  57
    op("jleq", OpcodeKind::Jump),               //  58
    op("jgrtr", OpcodeKind::Jump),              //  59
    op("jgeq", OpcodeKind::Jump),               //  60
    op("jsless", OpcodeKind::Jump),             //  61
    op("jsleq", OpcodeKind::Jump),              //  62
    op("jsgrtr", OpcodeKind::Jump),             //  63
    op("jsgeq", OpcodeKind::Jump),              //  64
    op("shl", OpcodeKind::Parm(0)),             //  65
    op("shr", OpcodeKind::Parm(0)),             //  66
    op("sshr", OpcodeKind::Parm(0)),            //  67
    op("shl.c.pri", OpcodeKind::Parm(1)),       //  68
    op("shl.c.alt", OpcodeKind::Parm(1)),       //  69
    op("shr.c.pri", OpcodeKind::Parm(1)),       //  70
    op("shr.c.alt", OpcodeKind::Parm(1)),       //  71
    op("smul", OpcodeKind::Parm(0)),            //  72
    op("sdiv", OpcodeKind::Parm(0)),            //  73
    op("sdiv.alt", OpcodeKind::Parm(0)),        //  74
    op("umul", OpcodeKind::Parm(0)),            //  75
    op("udiv", OpcodeKind::Parm(0)),            //  76
    op("udiv.alt", OpcodeKind::Parm(0)),        //  77
    op("add", OpcodeKind::Parm(0)),             //  78
    op("sub", OpcodeKind::Parm(0)),             //  79
    op("sub.alt", OpcodeKind::Parm(0)),         //  80
    op("and", OpcodeKind::Parm(0)),             //  81
    op("or", OpcodeKind::Parm(0)),              //  82
    op("xor", OpcodeKind::Parm(0)),             //  83
    op("not", OpcodeKind::Parm(0)),             //  84
    op("neg", OpcodeKind::Parm(0)),             //  85
    op("invert", OpcodeKind::Parm(0)),          //  86
    op("add.c", OpcodeKind::Parm(1)),           //  87
    op("smul.c", OpcodeKind::Parm(1)),          //  88
    op("zero.pri", OpcodeKind::Parm(0)),        //  89
    op("zero.alt", OpcodeKind::Parm(0)),        //  90
    op("zero", OpcodeKind::Parm(1)),            //  91
    op("zero.s", OpcodeKind::Parm(1)),          //  92
    op("sign.pri", OpcodeKind::Parm(0)),        //  93
    op("sign.alt", OpcodeKind::Parm(0)),        //  94
    op("eq", OpcodeKind::Parm(0)),              //  95
    op("neq", OpcodeKind::Parm(0)),             //  96
    op("less", OpcodeKind::Parm(0)),            //  97
    op("leq", OpcodeKind::Parm(0)),             //  98
    op("grtr", OpcodeKind::Parm(0)),            //  99
    op("geq", OpcodeKind::Parm(0)),             // 100
    op("sless", OpcodeKind::Parm(0)),           // 101
    op("sleq", OpcodeKind::Parm(0)),            // 102
    op("sgrtr", OpcodeKind::Parm(0)),           // 103
    op("sgeq", OpcodeKind::Parm(0)),            // 104
    op("eq.c.pri", OpcodeKind::Parm(1)),        // 105
    op("eq.c.alt", OpcodeKind::Parm(1)),        // 106
    op("inc.pri", OpcodeKind::Parm(0)),         // 107
    op("inc.alt", OpcodeKind::Parm(0)),         // 108
    op("inc", OpcodeKind::Parm(1)),             // 109
    op("inc.s", OpcodeKind::Parm(1)),           // 110
    op("inc.i", OpcodeKind::Parm(0)),           // 111
    op("dec.pri", OpcodeKind::Parm(0)),         // 112
    op("dec.alt", OpcodeKind::Parm(0)),         // 113
    op("dec", OpcodeKind::Parm(1)),             // 114
    op("dec.s", OpcodeKind::Parm(1)),           // 115
    op("dec.i", OpcodeKind::Parm(0)),           // 116
    op("movs", OpcodeKind::Parm(1)),            // 117
    op("cmps", OpcodeKind::Parm(1)),            // 118
    op("fill", OpcodeKind::Parm(1)),            // 119
    op("halt", OpcodeKind::Parm(1)),            // 120
    op("bounds", OpcodeKind::Parm(1)),          // 121
    op("sysreq.pri", OpcodeKind::Parm(0)),      // 122
    op("sysreq.c", OpcodeKind::SysReq),         // 123
    RESERVED,                                   // 124 (file)
    RESERVED,                                   // 125 (line)
    RESERVED,                                   // 126 (symbol)
    RESERVED,                                   // 127 (srange)
    op("jump.pri", OpcodeKind::Parm(0)),        // 128
    op("switch", OpcodeKind::Jump),             // 129
    op("casetbl", OpcodeKind::CaseTbl),         // 130
    op("swap.pri", OpcodeKind::Parm(0)),        // 131
    op("swap.alt", OpcodeKind::Parm(0)),        // 132
    op("push.adr", OpcodeKind::Parm(1)),        // 133
    op("nop", OpcodeKind::Parm(0)),             // 134
    op("sysreq.n", OpcodeKind::Parm(2)),        // 135
    RESERVED,                                   // 136 (symtag)
    op("break", OpcodeKind::Parm(0)),           // 137
    op("push2.c", OpcodeKind::Parm(2)),         // 138
    op("push2", OpcodeKind::Parm(2)),           // 139
    op("push2.s", OpcodeKind::Parm(2)),         // 140
    op("push2.adr", OpcodeKind::Parm(2)),       // 141
    op("push3.c", OpcodeKind::Parm(3)),         // 142
    op("push3", OpcodeKind::Parm(3)),           // 143
    op("push3.s", OpcodeKind::Parm(3)),         // 144
    op("push3.adr", OpcodeKind::Parm(3)),       // 145
    op("push4.c", OpcodeKind::Parm(4)),         // 146
    op("push4", OpcodeKind::Parm(4)),           // 147
    op("push4.s", OpcodeKind::Parm(4)),         // 148
    op("push4.adr", OpcodeKind::Parm(4)),       // 149
    op("push5.c", OpcodeKind::Parm(5)),         // 150
    op("push5", OpcodeKind::Parm(5)),           // 151
    op("push5.s", OpcodeKind::Parm(5)),         // 152
    op("push5.adr", OpcodeKind::Parm(5)),       // 153
    op("load.both", OpcodeKind::Parm(2)),       // 154
    op("load.s.both", OpcodeKind::Parm(2)),     // 155
    op("const", OpcodeKind::Parm(2)),           // 156
    op("const.s", OpcodeKind::Parm(2)),         // 157
];

/// Look up the catalog entry for `opcode`.
///
/// Returns `None` for out-of-range values and reserved slots, which the decoder renders as
/// unknown instructions.
#[must_use]
pub fn lookup(opcode: crate::Cell) -> Option<&'static Opcode> {
    OPCODES
        .get(opcode as usize)
        .filter(|entry| !entry.mnemonic.is_empty())
}
